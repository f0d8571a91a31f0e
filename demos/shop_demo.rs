//! 小型列印工作室示例
//!
//! 建立線材與產品、記錄銷售，最後列印補貨建議與月報表。

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use spool::{FilamentFields, FilamentUsage, InventoryService, MemoryStore, PartInput, ProductFields};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("=== 列印工作室庫存示例 ===\n");

    let mut service = InventoryService::new(MemoryStore::new());

    // 線材
    let black = service.save_filament(
        None,
        FilamentFields {
            brand: Some("Prusament".to_string()),
            material: Some("PLA".to_string()),
            color: Some("Galaxy Black".to_string()),
            cost_per_roll: Some(Decimal::from(25)),
            grams_per_roll: Some(Decimal::from(1000)),
            rolls_in_stock: Some(1),
            ..FilamentFields::default()
        },
    )?;
    let red = service.save_filament(
        None,
        FilamentFields {
            brand: Some("Prusament".to_string()),
            material: Some("PLA".to_string()),
            color: Some("Lipstick Red".to_string()),
            cost_per_roll: Some(Decimal::from(30)),
            grams_per_roll: Some(Decimal::from(1000)),
            ..FilamentFields::default()
        },
    )?;

    // 產品：本體 + 翅膀零件
    let dragon = service.save_product(
        None,
        ProductFields {
            product_type: Some("Dragon".to_string()),
            size: Some("Large".to_string()),
            color_variant: Some("Black/Red".to_string()),
            print_time_hours: Some(Decimal::from(6)),
            inventory_count: Some(2),
            filament_usage: Some(vec![FilamentUsage::new(black.id, Decimal::from(120))]),
            ..ProductFields::default()
        },
        Some(vec![PartInput {
            id: None,
            name: "Wings".to_string(),
            print_time_hours: Decimal::TWO,
            filament_usage: vec![FilamentUsage::new(red.id, Decimal::from(40))],
        }]),
    )?;

    println!("產品: {dragon}");
    println!(
        "可印數: {}",
        service.calculate_printable_count(dragon.id)?
    );

    // 銷售：兩筆成交
    service.create_sale(dragon.id, 2, Decimal::new(5998, 2))?;
    service.create_sale(dragon.id, 1, Decimal::from(32))?;

    println!(
        "\n售後可印數: {}",
        service.calculate_printable_count(dragon.id)?
    );
    println!(
        "未來 30 天預估銷量: {}",
        service.predict_sales_next_30_days(dragon.id)
    );

    // 補貨建議
    let todo = service.get_todo_data()?;
    println!("\n待印清單:");
    for product in &todo.to_print {
        println!("  - {product}");
    }
    println!("訂購建議:");
    for line in &todo.to_order {
        println!(
            "  - 線材 {}: 缺 {}g，建議訂 {} 捲",
            line.filament_id, line.grams, line.rolls
        );
    }

    // 月報表
    let now = Utc::now();
    let report = service.get_analytics_data(now - Duration::days(30), now)?;
    println!("\n=== 30 天報表 ===");
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
