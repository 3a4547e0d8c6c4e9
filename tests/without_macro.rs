//! Integration tests demonstrating a shared factory WITHOUT the macro.
//!
//! This shows the manual implementation approach: a `static` slot holding the
//! factory plus a zero-sized type implementing `SharedFactory`. This is what
//! `define_factory!` generates under the hood.
//!
//! NOTE: All tests use #[serial] because they share the same static factory (GATEWAYS).
//! Running them in parallel would cause interference and non-deterministic failures.

use serial_test::serial;
use singleton_factory::{
    BoxError, Factory, FactoryError, SharedFactory, SingletonSlot, SlotState, StaticSlot,
    TypeRegistry,
};
use std::sync::Arc;

// ============================================================================
// Manual Shared Factory Implementation (Without Macro)
// ============================================================================

pub trait PaymentGateway: Send {
    fn provider(&self) -> &'static str;
}

struct Stripe;
impl PaymentGateway for Stripe {
    fn provider(&self) -> &'static str {
        "stripe"
    }
}

struct PayPal;
impl PaymentGateway for PayPal {
    fn provider(&self) -> &'static str {
        "paypal"
    }
}

type Gateways = Factory<String, Box<dyn PaymentGateway>>;

fn builtin_gateways(registry: &TypeRegistry<String, Box<dyn PaymentGateway>>) {
    registry.register("stripe".to_string(), || {
        Box::new(Stripe) as Box<dyn PaymentGateway>
    });
}

fn build_gateways() -> Result<Gateways, BoxError> {
    Ok(Factory::with_builtins(builtin_gateways))
}

/// Define the static slot for our shared factory
static GATEWAY_SLOT: StaticSlot<Gateways> = SingletonSlot::new(build_gateways);

/// Our custom shared factory implementation
struct GatewayFactory;

impl SharedFactory for GatewayFactory {
    type Key = String;
    type Product = Box<dyn PaymentGateway>;

    fn slot() -> &'static StaticSlot<Gateways> {
        &GATEWAY_SLOT
    }
}

/// Constant instance of our shared factory
const GATEWAYS: GatewayFactory = GatewayFactory;

// ============================================================================
// Tests Using Manual Implementation
// ============================================================================

#[test]
#[serial]
fn test_builtins_available() {
    let gateway = GATEWAYS.create("stripe").unwrap();
    assert_eq!(gateway.provider(), "stripe");
    assert_eq!(GATEWAY_SLOT.state(), SlotState::Ready);
}

#[test]
#[serial]
fn test_register_new_gateway() -> Result<(), FactoryError<String>> {
    GATEWAYS.register("paypal".to_string(), || {
        Box::new(PayPal) as Box<dyn PaymentGateway>
    })?;

    assert_eq!(GATEWAYS.create("paypal")?.provider(), "paypal");
    Ok(())
}

#[test]
#[serial]
fn test_unknown_gateway() {
    match GATEWAYS.create("bitcoin") {
        Err(FactoryError::UnknownKey { key }) => assert_eq!(key, "bitcoin"),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(gateway) => panic!("unexpected gateway: {}", gateway.provider()),
    }
}

#[test]
#[serial]
fn test_instance_is_single_shared_factory() {
    let a = GATEWAYS.instance().unwrap();
    let b = GatewayFactory::slot().get_instance().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
#[serial]
fn test_fallible_gateway() {
    GATEWAYS
        .register_fallible("offline".to_string(), || {
            Err::<Box<dyn PaymentGateway>, _>("provider offline")
        })
        .unwrap();

    let err = GATEWAYS.create("offline").map(|g| g.provider()).unwrap_err();
    assert_eq!(err.to_string(), "construction failed: provider offline");
}
