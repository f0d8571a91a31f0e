//! 庫存服務層
//!
//! 表現層唯一的進入點。服務在建構時取得一個明確的儲存把手
//! （不使用全域狀態），所有多實體變更都包在單一交易內：
//! 任一步驟失敗即整體回滾，帳本不會出現部分調整。

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use spool_calc::{
    AnalyticsCalculator, AnalyticsReport, CostCalculator, PredictionCalculator,
    PrintableCalculator, ReorderCalculator, TodoData,
};
use spool_core::{
    BomView, Filament, FilamentId, FilamentPurchase, FilamentUsage, Part, PartId, Product,
    ProductId, Result, Sale, SpoolError,
};
use spool_store::MemoryStore;

/// 線材欄位（顯式欄位契約；`None` = 不變更 / 採預設）
#[derive(Debug, Clone, Default)]
pub struct FilamentFields {
    pub brand: Option<String>,
    pub material: Option<String>,
    pub color: Option<String>,
    pub cost_per_roll: Option<Decimal>,
    pub grams_per_roll: Option<Decimal>,
    pub grams_remaining: Option<Decimal>,
    pub rolls_in_stock: Option<u32>,
}

impl FilamentFields {
    /// 建立新線材；material、color、cost_per_roll 為必填
    fn build(self) -> Result<Filament> {
        let material = self
            .material
            .ok_or_else(|| SpoolError::Validation("線材缺少 material".to_string()))?;
        let color = self
            .color
            .ok_or_else(|| SpoolError::Validation("線材缺少 color".to_string()))?;
        let cost_per_roll = self
            .cost_per_roll
            .ok_or_else(|| SpoolError::Validation("線材缺少 cost_per_roll".to_string()))?;
        let grams_per_roll = self.grams_per_roll.unwrap_or_else(|| Decimal::from(1000));

        let mut filament = Filament::new(
            self.brand.unwrap_or_default(),
            material,
            color,
            cost_per_roll,
            grams_per_roll,
        );
        if let Some(grams) = self.grams_remaining {
            filament.grams_remaining = grams;
        }
        if let Some(rolls) = self.rolls_in_stock {
            filament.rolls_in_stock = rolls;
        }
        Ok(filament)
    }

    /// 套用到既有線材（只動有給值的欄位）
    fn apply(self, filament: &mut Filament) {
        if let Some(brand) = self.brand {
            filament.brand = brand;
        }
        if let Some(material) = self.material {
            filament.material = material;
        }
        if let Some(color) = self.color {
            filament.color = color;
        }
        if let Some(cost) = self.cost_per_roll {
            filament.cost_per_roll = cost;
        }
        if let Some(grams) = self.grams_per_roll {
            filament.grams_per_roll = grams;
        }
        if let Some(grams) = self.grams_remaining {
            filament.grams_remaining = grams;
        }
        if let Some(rolls) = self.rolls_in_stock {
            filament.rolls_in_stock = rolls;
        }
    }
}

/// 產品欄位（顯式欄位契約）
///
/// `filament_usage` 給值時整組取代產品的直接用料；
/// 克數非正的條目一律剔除。
#[derive(Debug, Clone, Default)]
pub struct ProductFields {
    pub product_type: Option<String>,
    pub size: Option<String>,
    pub color_variant: Option<String>,
    pub print_time_hours: Option<Decimal>,
    pub inventory_count: Option<i64>,
    pub filament_usage: Option<Vec<FilamentUsage>>,
}

impl ProductFields {
    fn build_product(&self) -> Result<Product> {
        let product_type = self
            .product_type
            .clone()
            .ok_or_else(|| SpoolError::Validation("產品缺少 product_type".to_string()))?;
        let size = self
            .size
            .clone()
            .ok_or_else(|| SpoolError::Validation("產品缺少 size".to_string()))?;
        let color_variant = self
            .color_variant
            .clone()
            .ok_or_else(|| SpoolError::Validation("產品缺少 color_variant".to_string()))?;

        let mut product = Product::new(product_type, size, color_variant);
        if let Some(hours) = self.print_time_hours {
            product.print_time_hours = hours;
        }
        if let Some(count) = self.inventory_count {
            product.inventory_count = count;
        }
        Ok(product)
    }

    fn apply_to(&self, product: &mut Product) {
        if let Some(product_type) = &self.product_type {
            product.product_type = product_type.clone();
        }
        if let Some(size) = &self.size {
            product.size = size.clone();
        }
        if let Some(color_variant) = &self.color_variant {
            product.color_variant = color_variant.clone();
        }
        if let Some(hours) = self.print_time_hours {
            product.print_time_hours = hours;
        }
        if let Some(count) = self.inventory_count {
            product.inventory_count = count;
        }
    }
}

/// 零件輸入：`id` 給值時更新既有零件，否則新建
#[derive(Debug, Clone)]
pub struct PartInput {
    pub id: Option<PartId>,
    pub name: String,
    pub print_time_hours: Decimal,
    pub filament_usage: Vec<FilamentUsage>,
}

/// 銷售記錄更新（顯式欄位契約）
#[derive(Debug, Clone, Default)]
pub struct SaleUpdate {
    pub product_id: Option<ProductId>,
    pub date: Option<DateTime<Utc>>,
    pub total_value: Option<Decimal>,
}

/// 庫存服務
pub struct InventoryService {
    store: MemoryStore,
}

/// 依用料表調整多個線材帳本；`factor` 為每單位用量的倍數
/// （正 = 消耗，負 = 沖銷）
fn adjust_filaments(
    tx: &mut MemoryStore,
    usage: &HashMap<FilamentId, Decimal>,
    factor: Decimal,
) -> Result<()> {
    for (filament_id, grams_per_unit) in usage {
        let mut filament = tx.filament(*filament_id)?;
        filament.adjust_inventory(grams_per_unit * factor);
        tx.update_filament(filament)?;
    }
    Ok(())
}

impl InventoryService {
    /// 以明確的儲存把手建構服務
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    /// 唯讀存取底層儲存
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// 取回底層儲存（交還所有權）
    pub fn into_store(self) -> MemoryStore {
        self.store
    }

    // ---- 線材 ----

    /// 所有線材（品牌、顏色排序）
    pub fn get_all_filaments(&self) -> Vec<Filament> {
        self.store.all_filaments()
    }

    /// 建立或更新線材
    pub fn save_filament(
        &mut self,
        filament_id: Option<FilamentId>,
        fields: FilamentFields,
    ) -> Result<Filament> {
        match filament_id {
            Some(id) => {
                let updated = self.store.transaction(|tx| {
                    let mut filament = tx.filament(id)?;
                    fields.apply(&mut filament);
                    tx.update_filament(filament.clone())?;
                    Ok(filament)
                })?;
                tracing::info!("已更新線材 {id}");
                Ok(updated)
            }
            None => {
                let created = self.store.insert_filament(fields.build()?)?;
                tracing::info!("已建立線材 {}", created.id);
                Ok(created)
            }
        }
    }

    /// 刪除線材（串聯移除引用它的用料與進貨記錄）
    pub fn delete_filament(&mut self, filament_id: FilamentId) -> Result<()> {
        self.store.delete_filament(filament_id)?;
        tracing::info!("已刪除線材 {filament_id}");
        Ok(())
    }

    /// 記錄進貨：整捲數入庫，留下歷史記錄
    pub fn record_purchase(
        &mut self,
        filament_id: FilamentId,
        rolls_bought: u32,
        grams_added: Decimal,
    ) -> Result<FilamentPurchase> {
        if rolls_bought == 0 {
            return Err(SpoolError::Validation("進貨捲數必須為正".to_string()));
        }
        self.store.transaction(|tx| {
            let mut filament = tx.filament(filament_id)?;
            filament.rolls_in_stock += rolls_bought;
            tx.update_filament(filament)?;
            let purchase =
                tx.insert_purchase(FilamentPurchase::new(filament_id, rolls_bought, grams_added))?;
            tracing::info!("線材 {filament_id} 進貨 {rolls_bought} 捲");
            Ok(purchase)
        })
    }

    /// 某線材的進貨歷史
    pub fn get_purchases(&self, filament_id: FilamentId) -> Vec<FilamentPurchase> {
        self.store.purchases_for(filament_id)
    }

    // ---- 產品 ----

    /// 所有產品（種類、顏色、尺寸排序）
    pub fn get_all_products(&self) -> Vec<Product> {
        self.store.all_products()
    }

    /// 建立或更新產品與其零件清單
    ///
    /// `parts` 給值時整組取代：清單內的零件更新或新建、
    /// 不在清單內的既有零件刪除，各零件的用料全清再重設。
    pub fn save_product(
        &mut self,
        product_id: Option<ProductId>,
        fields: ProductFields,
        parts: Option<Vec<PartInput>>,
    ) -> Result<Product> {
        let product = self.store.transaction(|tx| {
            let product = match product_id {
                Some(id) => {
                    let mut product = tx.product(id)?;
                    fields.apply_to(&mut product);
                    tx.update_product(product.clone())?;
                    product
                }
                None => tx.insert_product(fields.build_product()?)?,
            };

            // 產品直接用料：整組取代
            if let Some(usage) = &fields.filament_usage {
                tx.clear_product_usage(product.id);
                for entry in usage {
                    if entry.grams_needed > Decimal::ZERO {
                        tx.set_product_usage(product.id, entry.filament_id, entry.grams_needed)?;
                    }
                }
            }

            // 零件清單：整組取代
            if let Some(part_inputs) = &parts {
                let existing_ids: Vec<PartId> =
                    tx.parts_of(product.id).iter().map(|part| part.id).collect();
                let mut kept_ids = Vec::new();

                for input in part_inputs {
                    let part = match input.id {
                        Some(part_id) => {
                            let mut part = tx.part(part_id)?;
                            part.name = input.name.clone();
                            part.print_time_hours = input.print_time_hours;
                            tx.update_part(part.clone())?;
                            part
                        }
                        None => tx.insert_part(Part::new(
                            product.id,
                            input.name.clone(),
                            input.print_time_hours,
                        ))?,
                    };
                    kept_ids.push(part.id);

                    tx.clear_part_usage(part.id);
                    for entry in &input.filament_usage {
                        if entry.grams_needed > Decimal::ZERO {
                            tx.set_part_usage(part.id, entry.filament_id, entry.grams_needed)?;
                        }
                    }
                }

                for part_id in existing_ids {
                    if !kept_ids.contains(&part_id) {
                        tx.delete_part(part_id)?;
                    }
                }
            }

            Ok(product)
        })?;

        tracing::info!("已儲存產品 {}", product.id);
        Ok(product)
    }

    /// 刪除產品（串聯刪除零件、用料與銷售記錄）
    pub fn delete_product(&mut self, product_id: ProductId) -> Result<()> {
        self.store.delete_product(product_id)?;
        tracing::info!("已刪除產品 {product_id}");
        Ok(())
    }

    /// 目前線材庫存可生產的產品數（最稀缺線材為上限）
    pub fn calculate_printable_count(&self, product_id: ProductId) -> Result<i64> {
        let bom = self.store.bom_view(product_id)?;
        PrintableCalculator::calculate(&bom, &self.store.filament_map())
    }

    // ---- 銷售 ----

    /// 記錄一筆成交：拆成每單位一筆銷售記錄，扣產品庫存與線材
    ///
    /// 單位金額 = 總額/數量 取 2 位小數，最後一筆吸收取整誤差，
    /// 使各筆加總恰等於 `total_value`。`quantity <= 0` 不做任何事。
    pub fn create_sale(
        &mut self,
        product_id: ProductId,
        quantity: i64,
        total_value: Decimal,
    ) -> Result<Vec<Sale>> {
        if quantity <= 0 {
            return Ok(Vec::new());
        }
        if total_value < Decimal::ZERO {
            return Err(SpoolError::Validation("成交金額不可為負".to_string()));
        }

        let sales = self.store.transaction(|tx| {
            let bom = tx.bom_view(product_id)?;

            let unit_value = (total_value / Decimal::from(quantity)).round_dp(2);
            let mut sales = Vec::with_capacity(quantity as usize);
            for i in 0..quantity {
                // 最後一筆吸收取整誤差
                let value = if i == quantity - 1 {
                    total_value - unit_value * Decimal::from(quantity - 1)
                } else {
                    unit_value
                };
                let sale = Sale::new(product_id, value);
                tx.insert_sale(sale.clone())?;
                sales.push(sale);
            }

            // 庫存一次調整整個數量，不逐筆
            let mut product = bom.product.clone();
            product.adjust_inventory(-quantity);
            tx.update_product(product)?;

            let usage = CostCalculator::total_filament_usage(&bom);
            adjust_filaments(tx, &usage, Decimal::from(quantity))?;

            Ok(sales)
        })?;

        tracing::info!("已記錄銷售 {quantity} 件（產品 {product_id}）");
        Ok(sales)
    }

    /// 更新銷售記錄
    ///
    /// 換產品時先沖銷舊產品（庫存 +1、線材回補），再套用新產品
    /// （庫存 −1、線材扣除），之後才更新其餘欄位。
    pub fn update_sale(&mut self, sale_id: Uuid, update: SaleUpdate) -> Result<Sale> {
        let sale = self.store.transaction(|tx| {
            let mut sale = tx.sale(sale_id)?;

            if let Some(new_product_id) = update.product_id {
                if new_product_id != sale.product_id {
                    let old_bom = tx.bom_view(sale.product_id)?;
                    let new_bom = tx.bom_view(new_product_id)?;

                    // 沖銷舊產品
                    let mut old_product = old_bom.product.clone();
                    old_product.adjust_inventory(1);
                    tx.update_product(old_product)?;
                    adjust_filaments(
                        tx,
                        &CostCalculator::total_filament_usage(&old_bom),
                        Decimal::NEGATIVE_ONE,
                    )?;

                    // 套用新產品
                    let mut new_product = new_bom.product.clone();
                    new_product.adjust_inventory(-1);
                    tx.update_product(new_product)?;
                    adjust_filaments(
                        tx,
                        &CostCalculator::total_filament_usage(&new_bom),
                        Decimal::ONE,
                    )?;

                    sale.product_id = new_product_id;
                }
            }

            if let Some(value) = update.total_value {
                if value < Decimal::ZERO {
                    return Err(SpoolError::Validation("成交金額不可為負".to_string()));
                }
                sale.total_value = value;
            }
            if let Some(date) = update.date {
                sale.date = date;
            }

            tx.update_sale(sale.clone())?;
            Ok(sale)
        })?;

        tracing::info!("已更新銷售 {sale_id}");
        Ok(sale)
    }

    /// 刪除銷售記錄並沖銷庫存
    ///
    /// 沖銷以產品「目前的」BOM 計算；若配方在售出後改過，
    /// 回補量會與當初的消耗不同（已知限制）。
    pub fn delete_sale(&mut self, sale_id: Uuid) -> Result<()> {
        self.store.transaction(|tx| {
            let sale = tx.sale(sale_id)?;
            let bom = tx.bom_view(sale.product_id)?;

            let mut product = bom.product.clone();
            product.adjust_inventory(1);
            tx.update_product(product)?;

            adjust_filaments(
                tx,
                &CostCalculator::total_filament_usage(&bom),
                Decimal::NEGATIVE_ONE,
            )?;

            tx.delete_sale(sale_id)
        })?;

        tracing::info!("已刪除銷售 {sale_id}");
        Ok(())
    }

    /// 所有銷售，最新在前
    pub fn get_active_sales(&self) -> Vec<Sale> {
        self.store.sales_desc()
    }

    // ---- 報表 ----

    /// 彙總日期區間內的銷售（含頭尾；成本按目前 BOM 與價格）
    pub fn get_analytics_data(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<AnalyticsReport> {
        let sales = self.store.sales_between(start, end);

        let mut boms: HashMap<ProductId, BomView> = HashMap::new();
        for sale in &sales {
            if !boms.contains_key(&sale.product_id) {
                boms.insert(sale.product_id, self.store.bom_view(sale.product_id)?);
            }
        }

        AnalyticsCalculator::aggregate(&sales, &boms, &self.store.filament_map())
    }

    /// 補貨規劃：待印清單與線材訂購建議
    ///
    /// 產品以 ID 順序送入規劃器，同銷量時待印清單保留建立順序。
    pub fn get_todo_data(&self) -> Result<TodoData> {
        let mut boms = Vec::new();
        for product in self.store.products_by_id() {
            boms.push(self.store.bom_view(product.id)?);
        }

        Ok(ReorderCalculator::todo(
            &boms,
            &self.store.all_filaments(),
            &self.store.sale_counts(),
        ))
    }

    /// 預估某產品未來 30 天銷量（過去 90 天 ÷ 3）
    pub fn predict_sales_next_30_days(&self, product_id: ProductId) -> Decimal {
        PredictionCalculator::sales_next_30_days(&self.store.all_sales(), product_id, Utc::now())
    }

    /// 庫存低於等於門檻的產品
    pub fn get_low_stock_alerts(&self, threshold: i64) -> Vec<Product> {
        self.store
            .all_products()
            .into_iter()
            .filter(|product| product.inventory_count <= threshold)
            .collect()
    }
}
