//! Integration tests for cart totals and capacity

use mandir::prelude::{Cart, CartError, CartKind, CartTotals, NewCartItem, QuantityChange};
use rusty_money::{Money, iso::GBP};
use testresult::TestResult;

#[test]
fn donation_example_totals() -> TestResult {
    let mut cart = Cart::new(CartKind::Donation, GBP);

    let general = cart.add_item(
        NewCartItem::new("general", Money::from_minor(1000, GBP)).with_quantity(2),
    )?;
    let books = cart.add_item(NewCartItem::new("books", Money::from_minor(1500, GBP)))?;

    assert_eq!(
        cart.get(&general).map(|item| *item.total()),
        Some(Money::from_minor(2000, GBP))
    );
    assert_eq!(
        cart.get(&books).map(|item| *item.total()),
        Some(Money::from_minor(1500, GBP))
    );
    assert_eq!(cart.totals().subtotal, Money::from_minor(3500, GBP));

    cart.set_relief_enabled(true);

    let totals = cart.totals();

    assert_eq!(totals.relief_amount, Money::from_minor(875, GBP));
    assert_eq!(totals.charity_total, Money::from_minor(4375, GBP));
    assert_eq!(totals.grand_total, Money::from_minor(3500, GBP));
    assert_eq!(totals.item_count, 2);

    Ok(())
}

#[test]
fn subtotal_tracks_every_mutation() -> TestResult {
    let mut cart = Cart::new(CartKind::Donation, GBP);
    let amounts = [50, 101, 999, 2_500, 5_000_000];

    let mut ids = Vec::new();
    for (quantity, minor) in (1_i64..).zip(amounts) {
        ids.push(cart.add_item(
            NewCartItem::new("general", Money::from_minor(minor, GBP)).with_quantity(quantity),
        )?);
    }

    let check = |cart: &Cart| -> TestResult {
        let expected: i64 = cart.iter().map(|item| item.total().to_minor_units()).sum();

        assert_eq!(cart.totals().subtotal.to_minor_units(), expected);

        Ok(())
    };

    check(&cart)?;

    let second = ids.get(1).ok_or("missing id")?;
    assert_eq!(cart.update_quantity(second, 7), QuantityChange::Updated);
    check(&cart)?;

    let first = ids.first().ok_or("missing id")?;
    assert!(cart.remove_item(first).is_some());
    check(&cart)?;

    Ok(())
}

#[test]
fn relief_invariants_hold() -> TestResult {
    let mut cart = Cart::new(CartKind::Donation, GBP);

    for minor in [50, 333, 1_001, 12_345] {
        cart.add_item(NewCartItem::new("general", Money::from_minor(minor, GBP)))?;

        for enabled in [false, true] {
            cart.set_relief_enabled(enabled);
            let totals = cart.totals();

            let subtotal = totals.subtotal.to_minor_units();
            let relief = totals.relief_amount.to_minor_units();
            let expected_relief = if enabled { (subtotal * 25 + 50) / 100 } else { 0 };

            assert_eq!(relief, expected_relief, "relief for subtotal {subtotal}");
            assert_eq!(totals.charity_total.to_minor_units(), subtotal + relief);
            assert!(totals.charity_total.to_minor_units() >= totals.grand_total.to_minor_units());
            assert!(relief >= 0, "relief must not be negative");
        }
    }

    Ok(())
}

#[test]
fn donation_cart_holds_twenty_items() -> TestResult {
    let mut cart = Cart::new(CartKind::Donation, GBP);

    for _ in 0..20 {
        cart.add_item(NewCartItem::new("general", Money::from_minor(100, GBP)))?;
    }

    let before = cart.totals();
    let result = cart.add_item(NewCartItem::new("general", Money::from_minor(100, GBP)));

    assert_eq!(result, Err(CartError::CapacityExceeded { max: 20 }));
    assert_eq!(cart.len(), 20);
    assert_eq!(cart.totals(), before);

    Ok(())
}

#[test]
fn negative_quantity_matches_zero() -> TestResult {
    let mut zero = Cart::new(CartKind::Donation, GBP);
    let mut negative = Cart::new(CartKind::Donation, GBP);

    for cart in [&mut zero, &mut negative] {
        cart.add_item(NewCartItem::new("general", Money::from_minor(100, GBP)).with_id("a"))?;
        cart.add_item(NewCartItem::new("books", Money::from_minor(200, GBP)).with_id("b"))?;
    }

    assert_eq!(zero.update_quantity(&"a".into(), 0), QuantityChange::Removed);
    assert_eq!(negative.update_quantity(&"a".into(), -5), QuantityChange::Removed);
    assert_eq!(zero.items(), negative.items());

    Ok(())
}

#[test]
fn empty_cart_totals_are_zero() {
    let mut cart = Cart::new(CartKind::EventRegistration, GBP);
    cart.set_relief_enabled(true);

    assert_eq!(cart.totals(), CartTotals::zero(GBP));
}
