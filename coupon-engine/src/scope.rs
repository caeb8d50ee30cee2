//! Scope Matcher
//!
//! Restricts a coupon to the seller/product/category subset of the order
//! and computes the eligible order value the discount applies to. The
//! eligible value, not the full order total, feeds the min-order check
//! and the discount calculator.

use rust_decimal::prelude::*;
use shared::{CouponScope, OrderLine, RejectionReason};

/// Check if one order line falls inside the coupon scope
///
/// Restrictions narrow progressively: seller, then product set, then
/// category intersection. Unset fields do not restrict.
pub fn matches_scope(scope: &CouponScope, line: &OrderLine) -> bool {
    if let Some(seller) = &scope.seller_id
        && seller != &line.seller_id
    {
        return false;
    }
    if !scope.products.is_empty() && !scope.products.iter().any(|p| p == &line.product_id) {
        return false;
    }
    if !scope.categories.is_empty()
        && !line
            .category_ids
            .iter()
            .any(|c| scope.categories.contains(c))
    {
        return false;
    }
    true
}

/// Retain the order lines the coupon applies to
pub fn eligible_lines<'a>(scope: &CouponScope, lines: &'a [OrderLine]) -> Vec<&'a OrderLine> {
    lines.iter().filter(|l| matches_scope(scope, l)).collect()
}

/// Sum the value of in-scope lines
///
/// Fails with ScopeMismatch when the restrictions eliminate every line.
/// An unrestricted scope over an empty order is also a mismatch: there is
/// nothing to discount.
pub fn eligible_order_value(
    scope: &CouponScope,
    lines: &[OrderLine],
) -> Result<f64, RejectionReason> {
    let retained = eligible_lines(scope, lines);
    if retained.is_empty() {
        return Err(RejectionReason::ScopeMismatch);
    }
    let sum = retained
        .iter()
        .map(|l| Decimal::from_f64(l.line_value).unwrap_or_default())
        .sum::<Decimal>();
    Ok(sum.to_f64().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_line(seller: &str, product: &str, categories: &[&str], value: f64) -> OrderLine {
        OrderLine {
            seller_id: seller.to_string(),
            product_id: product.to_string(),
            category_ids: categories.iter().map(|c| c.to_string()).collect(),
            line_value: value,
        }
    }

    fn make_scope(
        seller: Option<&str>,
        products: &[&str],
        categories: &[&str],
    ) -> CouponScope {
        CouponScope {
            seller_id: seller.map(|s| s.to_string()),
            products: products.iter().map(|p| p.to_string()).collect(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn test_unrestricted_scope_takes_whole_order() {
        let lines = vec![
            make_line("s1", "p1", &["c1"], 100.0),
            make_line("s2", "p2", &["c2"], 50.0),
        ];
        let value = eligible_order_value(&CouponScope::default(), &lines).unwrap();
        assert_eq!(value, 150.0);
    }

    #[test]
    fn test_seller_scope_retains_that_seller_only() {
        let lines = vec![
            make_line("s1", "p1", &[], 100.0),
            make_line("s2", "p2", &[], 50.0),
            make_line("s1", "p3", &[], 30.0),
        ];
        let scope = make_scope(Some("s1"), &[], &[]);
        assert_eq!(eligible_order_value(&scope, &lines).unwrap(), 130.0);
    }

    #[test]
    fn test_product_scope_narrows_within_seller() {
        let lines = vec![
            make_line("s1", "p1", &[], 100.0),
            make_line("s1", "p2", &[], 50.0),
            make_line("s2", "p1", &[], 70.0),
        ];
        // Seller + product restrictions stack
        let scope = make_scope(Some("s1"), &["p1"], &[]);
        assert_eq!(eligible_order_value(&scope, &lines).unwrap(), 100.0);
    }

    #[test]
    fn test_category_scope_matches_on_intersection() {
        let lines = vec![
            make_line("s1", "p1", &["c1", "c2"], 100.0),
            make_line("s1", "p2", &["c3"], 50.0),
        ];
        let scope = make_scope(None, &[], &["c2", "c9"]);
        assert_eq!(eligible_order_value(&scope, &lines).unwrap(), 100.0);
    }

    #[test]
    fn test_no_matching_lines_is_scope_mismatch() {
        let lines = vec![make_line("s1", "p1", &["c1"], 100.0)];
        let scope = make_scope(Some("s2"), &[], &[]);
        assert_eq!(
            eligible_order_value(&scope, &lines),
            Err(RejectionReason::ScopeMismatch)
        );
    }

    #[test]
    fn test_empty_order_is_scope_mismatch() {
        assert_eq!(
            eligible_order_value(&CouponScope::default(), &[]),
            Err(RejectionReason::ScopeMismatch)
        );
    }

    #[test]
    fn test_line_without_categories_never_matches_category_scope() {
        let lines = vec![make_line("s1", "p1", &[], 100.0)];
        let scope = make_scope(None, &[], &["c1"]);
        assert_eq!(
            eligible_order_value(&scope, &lines),
            Err(RejectionReason::ScopeMismatch)
        );
    }
}
