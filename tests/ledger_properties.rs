//! Property tests for the cart ledger invariants.

use decimal_percentage::Percentage;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::INR};

use till::{
    ledger::{Ledger, LedgerError},
    products::{ProductDescriptor, ProductId},
};

#[derive(Debug, Clone)]
enum Op {
    Add { product: usize, quantity: i64 },
    Update { product: usize, quantity: i64 },
    Remove { product: usize },
}

fn catalog() -> Vec<ProductDescriptor> {
    [(99_999, 25), (24_999, 15), (1_999, 1), (89_999, 8), (39_999, 0)]
        .into_iter()
        .enumerate()
        .map(|(idx, (minor, stock))| ProductDescriptor {
            id: ProductId::new(idx.to_string()),
            name: format!("Product {idx}"),
            unit_price: Money::from_minor(minor, INR),
            stock_ceiling: stock,
        })
        .collect()
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..5, -3i64..40).prop_map(|(product, quantity)| Op::Add { product, quantity }),
        (0usize..5, -3i64..40).prop_map(|(product, quantity)| Op::Update { product, quantity }),
        (0usize..5).prop_map(|product| Op::Remove { product }),
    ]
}

fn apply(ledger: &mut Ledger, catalog: &[ProductDescriptor], op: &Op) {
    let product = |idx: usize| catalog.get(idx).cloned();

    // Errors (out of stock, not found) leave the ledger unchanged and are expected here.
    match *op {
        Op::Add { product: idx, quantity } => {
            if let Some(descriptor) = product(idx) {
                let _outcome = ledger.add_with_quantity(&descriptor, quantity);
            }
        }
        Op::Update { product: idx, quantity } => {
            if let Some(descriptor) = product(idx) {
                let _update = ledger.update_quantity(&descriptor.id, quantity);
            }
        }
        Op::Remove { product: idx } => {
            if let Some(descriptor) = product(idx) {
                let _removed = ledger.remove(&descriptor.id);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    })]

    /// Every line stays within `1..=stock_ceiling` whatever the sequence of operations.
    #[test]
    fn quantities_stay_within_stock(ops in prop::collection::vec(op(), 0..40)) {
        let catalog = catalog();
        let mut ledger = Ledger::new(INR);

        for op in &ops {
            apply(&mut ledger, &catalog, op);

            for item in ledger.items() {
                prop_assert!(item.quantity() >= 1);
                prop_assert!(item.quantity() <= item.stock_ceiling());
            }
        }
    }

    /// Subtotal is the sum of line totals, independent of insertion order.
    #[test]
    fn subtotal_ignores_insertion_order(
        quantities in prop::collection::vec(1i64..30, 4),
        order in Just(vec![0usize, 1, 2, 3]).prop_shuffle(),
    ) {
        let catalog = catalog();
        let mut forward = Ledger::new(INR);
        let mut shuffled = Ledger::new(INR);

        for (idx, quantity) in quantities.iter().enumerate() {
            if let Some(descriptor) = catalog.get(idx) {
                forward.add_with_quantity(descriptor, *quantity)?;
            }
        }

        for &idx in &order {
            if let (Some(descriptor), Some(quantity)) = (catalog.get(idx), quantities.get(idx)) {
                shuffled.add_with_quantity(descriptor, *quantity)?;
            }
        }

        let expected = forward
            .items()
            .iter()
            .map(|item| item.line_total().map(|total| total.to_minor_units()))
            .sum::<Result<i64, _>>()?;

        prop_assert_eq!(forward.subtotal()?, shuffled.subtotal()?);
        prop_assert_eq!(forward.subtotal()?.to_minor_units(), expected);
    }

    /// Adding a new product then removing it restores the prior ledger.
    #[test]
    fn add_then_remove_is_identity(
        ops in prop::collection::vec(op(), 0..20),
        quantity in -5i64..50,
    ) {
        let catalog = catalog();
        let mut ledger = Ledger::new(INR);

        for op in &ops {
            apply(&mut ledger, &catalog, op);
        }

        let extra = ProductDescriptor {
            id: ProductId::new("extra"),
            name: "Extra".to_string(),
            unit_price: Money::from_minor(500, INR),
            stock_ceiling: 10,
        };
        let before = ledger.clone();

        ledger.add_with_quantity(&extra, quantity)?;
        ledger.remove(&extra.id)?;

        prop_assert_eq!(ledger, before);
    }

    /// Total is subtotal plus tax, and tax scales the subtotal exactly.
    #[test]
    fn total_is_subtotal_plus_exact_tax(
        ops in prop::collection::vec(op(), 0..20),
        basis_points in 0i64..3_000,
    ) {
        let catalog = catalog();
        let mut ledger = Ledger::new(INR);

        for op in &ops {
            apply(&mut ledger, &catalog, op);
        }

        let rate = Percentage::from(Decimal::new(basis_points, 4));
        let subtotal = Decimal::new(ledger.subtotal()?.to_minor_units(), 2);

        prop_assert_eq!(ledger.tax(rate)?.amount(), subtotal * Decimal::new(basis_points, 4));
        prop_assert_eq!(
            ledger.total(rate)?.amount(),
            subtotal + ledger.tax(rate)?.amount()
        );
    }
}

#[test]
fn out_of_stock_add_is_rejected() {
    let catalog = catalog();
    let mut ledger = Ledger::new(INR);

    let sold_out = catalog.get(4).cloned();

    assert!(matches!(
        sold_out.map(|descriptor| ledger.add(&descriptor)),
        Some(Err(LedgerError::OutOfStock(_)))
    ));
    assert!(ledger.is_empty());
}
