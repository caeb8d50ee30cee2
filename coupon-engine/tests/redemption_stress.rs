//! Redemption storm tests
//!
//! Many concurrent checkouts against capped coupons: exactly the usage
//! limit may commit, the rest must fail deterministically, and the
//! counters must balance exactly afterwards.

use chrono::{Duration, Utc};
use coupon_engine::store::MemoryStore;
use coupon_engine::{CouponEngine, CouponStore, EngineConfig};
use rand::Rng;
use shared::{
    Coupon, CouponScope, CouponType, Discount, DiscountKind, OrderContext, OrderLine,
    RejectionReason, UsageLimits, UserCoupon, UserCouponStatus,
};
use std::sync::Arc;
use std::sync::Once;

const CLAIMANTS: usize = 64;
const USAGE_LIMIT: u32 = 10;

static LOGGING: Once = Once::new();

fn init_test_logging() {
    LOGGING.call_once(coupon_engine::init_logger);
}

fn make_coupon(id: &str, code: &str, limits: UsageLimits) -> Coupon {
    let now = Utc::now();
    Coupon {
        id: id.to_string(),
        code: code.to_string(),
        coupon_type: CouponType::Event,
        discount: Discount {
            kind: DiscountKind::Fixed,
            value: 10_000.0,
            max_discount: None,
            min_order_value: None,
        },
        scope: CouponScope::default(),
        conditions: vec![],
        limits,
        eligible_users: vec![],
        excluded_users: vec![],
        start_at: now - Duration::days(1),
        end_at: now + Duration::days(1),
        is_active: true,
        created_at: None,
    }
}

fn make_claim(id: &str, user_id: &str, coupon_id: &str) -> UserCoupon {
    UserCoupon {
        id: id.to_string(),
        user_id: user_id.to_string(),
        coupon_id: coupon_id.to_string(),
        status: UserCouponStatus::Saved,
        saved_at: Utc::now() - Duration::hours(1),
        used_at: None,
        expires_at: None,
        order_id: None,
    }
}

fn random_order(rng: &mut impl Rng) -> OrderContext {
    OrderContext {
        lines: vec![OrderLine {
            seller_id: "seller-1".to_string(),
            product_id: format!("p{}", rng.gen_range(1..100)),
            category_ids: vec![],
            line_value: rng.gen_range(50_000.0..500_000.0),
        }],
        shipping_fee: 15_000.0,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn storm_commits_exactly_the_usage_limit() {
    init_test_logging();
    let store = Arc::new(MemoryStore::new());
    store.insert_coupon(make_coupon(
        "flash",
        "FLASH",
        UsageLimits {
            usage_limit: Some(USAGE_LIMIT),
            per_user_limit: None,
        },
    ));
    for i in 0..CLAIMANTS {
        store.insert_user_coupon(make_claim(
            &format!("uc-{i}"),
            &format!("user-{i}"),
            "flash",
        ));
    }
    let engine = CouponEngine::new(store.clone(), EngineConfig::default());

    let mut handles = Vec::with_capacity(CLAIMANTS);
    for i in 0..CLAIMANTS {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let order = random_order(&mut rand::thread_rng());
            engine
                .redeem(&format!("uc-{i}"), &format!("order-{i}"), &order)
                .await
        }));
    }

    let mut committed = 0u32;
    let mut sold_out = 0u32;
    for handle in handles {
        let outcome = handle.await.unwrap().expect("no engine errors expected");
        if outcome.committed {
            committed += 1;
        } else {
            assert_eq!(
                outcome.result.reason,
                Some(RejectionReason::UsageLimitExceeded)
            );
            sold_out += 1;
        }
    }

    assert_eq!(committed, USAGE_LIMIT);
    assert_eq!(sold_out, CLAIMANTS as u32 - USAGE_LIMIT);

    // No over-count, no lost increment
    let counters = store.usage_counters("flash").await.unwrap();
    assert_eq!(counters.counters.global_used, USAGE_LIMIT);
    assert_eq!(
        counters.counters.per_user_used.values().sum::<u32>(),
        USAGE_LIMIT
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn per_user_limit_holds_under_concurrent_claims() {
    init_test_logging();
    let store = Arc::new(MemoryStore::new());
    store.insert_coupon(make_coupon(
        "single",
        "SINGLE",
        UsageLimits {
            usage_limit: None,
            per_user_limit: Some(1),
        },
    ));
    // One user holding many claims, racing distinct orders
    for i in 0..16 {
        store.insert_user_coupon(make_claim(&format!("uc-{i}"), "user-1", "single"));
    }
    let engine = CouponEngine::new(store.clone(), EngineConfig::default());

    let mut handles = Vec::new();
    for i in 0..16 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let order = random_order(&mut rand::thread_rng());
            engine
                .redeem(&format!("uc-{i}"), &format!("order-{i}"), &order)
                .await
        }));
    }

    let mut committed = 0u32;
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        if outcome.committed {
            committed += 1;
        } else {
            assert_eq!(
                outcome.result.reason,
                Some(RejectionReason::PerUserLimitExceeded)
            );
        }
    }

    assert_eq!(committed, 1);
    let counters = store.usage_counters("single").await.unwrap();
    assert_eq!(counters.counters.used_by("user-1"), 1);
    assert_eq!(counters.counters.global_used, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn distinct_coupons_never_contend() {
    init_test_logging();
    let store = Arc::new(MemoryStore::new());
    let coupon_ids = ["storm-a", "storm-b", "storm-c"];
    for (n, id) in coupon_ids.iter().enumerate() {
        store.insert_coupon(make_coupon(
            id,
            &format!("STORM{n}"),
            UsageLimits {
                usage_limit: Some(5),
                per_user_limit: None,
            },
        ));
        for i in 0..20 {
            store.insert_user_coupon(make_claim(
                &format!("{id}-uc-{i}"),
                &format!("{id}-user-{i}"),
                id,
            ));
        }
    }
    let engine = CouponEngine::new(store.clone(), EngineConfig::default());

    // Interleave redemptions across all three coupons
    let mut handles = Vec::new();
    for id in coupon_ids {
        for i in 0..20 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                let order = random_order(&mut rand::thread_rng());
                engine
                    .redeem(&format!("{id}-uc-{i}"), &format!("{id}-order-{i}"), &order)
                    .await
            }));
        }
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // Each coupon fills exactly its own cap
    for id in coupon_ids {
        let counters = store.usage_counters(id).await.unwrap();
        assert_eq!(counters.counters.global_used, 5);
    }
}
