//! Terminal rendering.
//!
//! Results go to stdout; errors and logs go to stderr.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use fudsiti_storefront::cart::Cart;
use fudsiti_storefront::error::AppError;
use fudsiti_storefront::models::{Address, Order, Product, User};

pub fn line(text: impl std::fmt::Display) {
    println!("{text}");
}

pub fn error(err: &AppError) {
    eprintln!("error: {}", err.user_message());
}

pub fn cart(cart: &Cart, catalog: &[Product]) {
    if cart.is_empty() {
        println!("Cart is empty");
        return;
    }

    if catalog.is_empty() {
        for item in cart.items() {
            println!("{}  {} {}", item.product_id, item.quantity, item.unit);
        }
        println!("{} line(s); pass --catalog for prices", cart.len());
        return;
    }

    for group in cart.by_vendor(catalog) {
        println!("{} ({})", group.vendor_name, group.vendor_id);
        for line in &group.lines {
            print!(
                "  {}  {} {} x {} = {}",
                line.item.product_id,
                line.item.quantity,
                line.item.unit,
                line.unit_price.display(),
                line.line_total.display()
            );
            match &line.item.comment {
                Some(comment) => println!("  ({comment})"),
                None => println!(),
            }
        }
        println!("  subtotal: {}", group.total.display());
    }
    println!("Total: {}", cart.total(catalog).display());
}

pub fn order(order: &Order) {
    println!(
        "{}  {:<10} {} item(s)  {} ₽  {} / {}  {}",
        order.id,
        order.status.to_string(),
        order.items.len(),
        order.total,
        order.delivery_method,
        order.payment_method,
        order.created_at.format("%Y-%m-%d %H:%M"),
    );
    println!("    {}", order.delivery_address);
}

pub fn orders(orders: &[Order]) {
    if orders.is_empty() {
        println!("No orders");
    }
    for o in orders {
        order(o);
    }
}

pub fn products(products: &[&Product]) {
    for p in products {
        let stock = if p.in_stock { "" } else { "  [out of stock]" };
        println!(
            "{}  {}  {} / {}  {}  [{}]{stock}",
            p.id,
            p.name,
            p.unit_price().display(),
            p.unit,
            p.vendor_name,
            p.category
        );
    }
    println!("{} product(s)", products.len());
}

pub fn user(user: &User) {
    println!("{} <{}> {}", user.name, user.email, user.phone);
    println!(
        "role: {}  email verified: {}  phone verified: {}",
        user.role, user.email_verified, user.phone_verified
    );
}

pub fn addresses(addresses: &[Address]) {
    if addresses.is_empty() {
        println!("No saved addresses");
    }
    for a in addresses {
        println!("{}  {}", a.id, a.one_line());
    }
}
