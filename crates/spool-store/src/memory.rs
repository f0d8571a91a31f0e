//! 記憶體儲存實作

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use spool_core::{
    BomView, Filament, FilamentId, FilamentPurchase, FilamentUsage, Part, PartId, PartView,
    Product, ProductId, PurchaseId, Result, Sale, SpoolError,
};

/// 記憶體儲存
///
/// 以 BTreeMap 為後端（鍵序遞增 = 插入順序，迭代結果可重現）。
/// 所有讀取回傳複本；交易以整體快照實現，失敗時回復快照。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    filaments: BTreeMap<FilamentId, Filament>,
    purchases: BTreeMap<PurchaseId, FilamentPurchase>,
    products: BTreeMap<ProductId, Product>,
    parts: BTreeMap<PartId, Part>,
    product_usage: BTreeMap<ProductId, Vec<FilamentUsage>>,
    part_usage: BTreeMap<PartId, Vec<FilamentUsage>>,
    sales: Vec<Sale>,
    next_filament_id: FilamentId,
    next_purchase_id: PurchaseId,
    next_product_id: ProductId,
    next_part_id: PartId,
}

impl MemoryStore {
    /// 創建空的儲存
    pub fn new() -> Self {
        Self::default()
    }

    /// 交易範圍：`f` 回傳錯誤時回復進入前的完整快照
    ///
    /// 可巢狀呼叫；內層回滾只影響內層範圍。
    pub fn transaction<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let snapshot = self.clone();
        match f(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::warn!("交易失敗，回滾: {err}");
                *self = snapshot;
                Err(err)
            }
        }
    }

    // ---- 線材 ----

    fn check_filament_unique(&self, candidate: &Filament) -> Result<()> {
        let duplicate = self.filaments.values().any(|existing| {
            existing.id != candidate.id
                && existing.brand == candidate.brand
                && existing.material == candidate.material
                && existing.color == candidate.color
        });
        if duplicate {
            return Err(SpoolError::Integrity(format!(
                "線材 ({}, {}, {}) 已存在",
                candidate.brand, candidate.material, candidate.color
            )));
        }
        Ok(())
    }

    /// 新增線材，配發ID
    pub fn insert_filament(&mut self, mut filament: Filament) -> Result<Filament> {
        self.next_filament_id += 1;
        filament.id = self.next_filament_id;
        self.check_filament_unique(&filament)?;
        self.filaments.insert(filament.id, filament.clone());
        Ok(filament)
    }

    /// 覆寫既有線材
    pub fn update_filament(&mut self, filament: Filament) -> Result<()> {
        if !self.filaments.contains_key(&filament.id) {
            return Err(SpoolError::NotFound(format!("線材 {}", filament.id)));
        }
        self.check_filament_unique(&filament)?;
        self.filaments.insert(filament.id, filament);
        Ok(())
    }

    /// 讀取單一線材
    pub fn filament(&self, id: FilamentId) -> Result<Filament> {
        self.filaments
            .get(&id)
            .cloned()
            .ok_or_else(|| SpoolError::NotFound(format!("線材 {id}")))
    }

    /// 刪除線材，串聯移除引用它的用料與進貨記錄
    pub fn delete_filament(&mut self, id: FilamentId) -> Result<()> {
        self.filaments
            .remove(&id)
            .ok_or_else(|| SpoolError::NotFound(format!("線材 {id}")))?;

        for usage in self.product_usage.values_mut() {
            usage.retain(|entry| entry.filament_id != id);
        }
        for usage in self.part_usage.values_mut() {
            usage.retain(|entry| entry.filament_id != id);
        }
        self.purchases.retain(|_, purchase| purchase.filament_id != id);
        Ok(())
    }

    /// 所有線材（品牌、顏色排序）
    pub fn all_filaments(&self) -> Vec<Filament> {
        let mut filaments: Vec<Filament> = self.filaments.values().cloned().collect();
        filaments.sort_by(|a, b| (&a.brand, &a.color).cmp(&(&b.brand, &b.color)));
        filaments
    }

    /// 線材ID → 線材（計算層輸入）
    pub fn filament_map(&self) -> HashMap<FilamentId, Filament> {
        self.filaments
            .iter()
            .map(|(id, filament)| (*id, filament.clone()))
            .collect()
    }

    // ---- 進貨 ----

    /// 新增進貨記錄，配發ID
    pub fn insert_purchase(&mut self, mut purchase: FilamentPurchase) -> Result<FilamentPurchase> {
        if !self.filaments.contains_key(&purchase.filament_id) {
            return Err(SpoolError::NotFound(format!("線材 {}", purchase.filament_id)));
        }
        self.next_purchase_id += 1;
        purchase.id = self.next_purchase_id;
        self.purchases.insert(purchase.id, purchase.clone());
        Ok(purchase)
    }

    /// 某線材的進貨歷史（插入順序）
    pub fn purchases_for(&self, filament_id: FilamentId) -> Vec<FilamentPurchase> {
        self.purchases
            .values()
            .filter(|purchase| purchase.filament_id == filament_id)
            .cloned()
            .collect()
    }

    // ---- 產品 ----

    fn check_product_unique(&self, candidate: &Product) -> Result<()> {
        let duplicate = self.products.values().any(|existing| {
            existing.id != candidate.id
                && existing.product_type == candidate.product_type
                && existing.size == candidate.size
                && existing.color_variant == candidate.color_variant
        });
        if duplicate {
            return Err(SpoolError::Integrity(format!(
                "產品 ({}, {}, {}) 已存在",
                candidate.product_type, candidate.size, candidate.color_variant
            )));
        }
        Ok(())
    }

    /// 新增產品，配發ID
    pub fn insert_product(&mut self, mut product: Product) -> Result<Product> {
        self.next_product_id += 1;
        product.id = self.next_product_id;
        self.check_product_unique(&product)?;
        self.products.insert(product.id, product.clone());
        Ok(product)
    }

    /// 覆寫既有產品
    pub fn update_product(&mut self, product: Product) -> Result<()> {
        if !self.products.contains_key(&product.id) {
            return Err(SpoolError::NotFound(format!("產品 {}", product.id)));
        }
        self.check_product_unique(&product)?;
        self.products.insert(product.id, product);
        Ok(())
    }

    /// 讀取單一產品
    pub fn product(&self, id: ProductId) -> Result<Product> {
        self.products
            .get(&id)
            .cloned()
            .ok_or_else(|| SpoolError::NotFound(format!("產品 {id}")))
    }

    /// 刪除產品；顯式串聯刪除其零件、所有用料與銷售記錄
    pub fn delete_product(&mut self, id: ProductId) -> Result<()> {
        self.products
            .remove(&id)
            .ok_or_else(|| SpoolError::NotFound(format!("產品 {id}")))?;

        self.product_usage.remove(&id);

        let owned_parts: Vec<PartId> = self
            .parts
            .values()
            .filter(|part| part.product_id == id)
            .map(|part| part.id)
            .collect();
        for part_id in owned_parts {
            self.parts.remove(&part_id);
            self.part_usage.remove(&part_id);
        }

        self.sales.retain(|sale| sale.product_id != id);
        Ok(())
    }

    /// 所有產品（ID 順序 = 建立順序）
    pub fn products_by_id(&self) -> Vec<Product> {
        self.products.values().cloned().collect()
    }

    /// 所有產品（種類、顏色、尺寸排序）
    pub fn all_products(&self) -> Vec<Product> {
        let mut products: Vec<Product> = self.products.values().cloned().collect();
        products.sort_by(|a, b| {
            (&a.product_type, &a.color_variant, &a.size)
                .cmp(&(&b.product_type, &b.color_variant, &b.size))
        });
        products
    }

    // ---- 零件 ----

    /// 新增零件，配發ID
    pub fn insert_part(&mut self, mut part: Part) -> Result<Part> {
        if !self.products.contains_key(&part.product_id) {
            return Err(SpoolError::NotFound(format!("產品 {}", part.product_id)));
        }
        self.next_part_id += 1;
        part.id = self.next_part_id;
        self.parts.insert(part.id, part.clone());
        Ok(part)
    }

    /// 覆寫既有零件
    pub fn update_part(&mut self, part: Part) -> Result<()> {
        if !self.parts.contains_key(&part.id) {
            return Err(SpoolError::NotFound(format!("零件 {}", part.id)));
        }
        self.parts.insert(part.id, part);
        Ok(())
    }

    /// 讀取單一零件
    pub fn part(&self, id: PartId) -> Result<Part> {
        self.parts
            .get(&id)
            .cloned()
            .ok_or_else(|| SpoolError::NotFound(format!("零件 {id}")))
    }

    /// 刪除零件與其用料
    pub fn delete_part(&mut self, id: PartId) -> Result<()> {
        self.parts
            .remove(&id)
            .ok_or_else(|| SpoolError::NotFound(format!("零件 {id}")))?;
        self.part_usage.remove(&id);
        Ok(())
    }

    /// 某產品的零件（插入順序）
    pub fn parts_of(&self, product_id: ProductId) -> Vec<Part> {
        self.parts
            .values()
            .filter(|part| part.product_id == product_id)
            .cloned()
            .collect()
    }

    // ---- 用料 ----

    fn set_usage(usage: &mut Vec<FilamentUsage>, filament_id: FilamentId, grams: Decimal) {
        // 同一線材重複加入時覆寫克數
        if let Some(entry) = usage.iter_mut().find(|entry| entry.filament_id == filament_id) {
            entry.grams_needed = grams;
        } else {
            usage.push(FilamentUsage::new(filament_id, grams));
        }
    }

    /// 設定產品直接用料（重複線材覆寫）
    pub fn set_product_usage(
        &mut self,
        product_id: ProductId,
        filament_id: FilamentId,
        grams: Decimal,
    ) -> Result<()> {
        if !self.products.contains_key(&product_id) {
            return Err(SpoolError::NotFound(format!("產品 {product_id}")));
        }
        if !self.filaments.contains_key(&filament_id) {
            return Err(SpoolError::NotFound(format!("線材 {filament_id}")));
        }
        Self::set_usage(self.product_usage.entry(product_id).or_default(), filament_id, grams);
        Ok(())
    }

    /// 設定零件用料（重複線材覆寫）
    pub fn set_part_usage(
        &mut self,
        part_id: PartId,
        filament_id: FilamentId,
        grams: Decimal,
    ) -> Result<()> {
        if !self.parts.contains_key(&part_id) {
            return Err(SpoolError::NotFound(format!("零件 {part_id}")));
        }
        if !self.filaments.contains_key(&filament_id) {
            return Err(SpoolError::NotFound(format!("線材 {filament_id}")));
        }
        Self::set_usage(self.part_usage.entry(part_id).or_default(), filament_id, grams);
        Ok(())
    }

    /// 清空產品直接用料
    pub fn clear_product_usage(&mut self, product_id: ProductId) {
        self.product_usage.remove(&product_id);
    }

    /// 清空零件用料
    pub fn clear_part_usage(&mut self, part_id: PartId) {
        self.part_usage.remove(&part_id);
    }

    /// 組裝產品的 BOM 視圖
    pub fn bom_view(&self, product_id: ProductId) -> Result<BomView> {
        let product = self.product(product_id)?;
        let direct_usage = self
            .product_usage
            .get(&product_id)
            .cloned()
            .unwrap_or_default();
        let parts = self
            .parts_of(product_id)
            .into_iter()
            .map(|part| {
                let usage = self.part_usage.get(&part.id).cloned().unwrap_or_default();
                PartView { part, usage }
            })
            .collect();

        Ok(BomView {
            product,
            direct_usage,
            parts,
        })
    }

    // ---- 銷售 ----

    /// 新增銷售記錄
    pub fn insert_sale(&mut self, sale: Sale) -> Result<()> {
        if !self.products.contains_key(&sale.product_id) {
            return Err(SpoolError::NotFound(format!("產品 {}", sale.product_id)));
        }
        self.sales.push(sale);
        Ok(())
    }

    /// 覆寫既有銷售記錄
    pub fn update_sale(&mut self, sale: Sale) -> Result<()> {
        if !self.products.contains_key(&sale.product_id) {
            return Err(SpoolError::NotFound(format!("產品 {}", sale.product_id)));
        }
        let slot = self
            .sales
            .iter_mut()
            .find(|existing| existing.id == sale.id)
            .ok_or_else(|| SpoolError::NotFound(format!("銷售 {}", sale.id)))?;
        *slot = sale;
        Ok(())
    }

    /// 讀取單筆銷售
    pub fn sale(&self, id: Uuid) -> Result<Sale> {
        self.sales
            .iter()
            .find(|sale| sale.id == id)
            .cloned()
            .ok_or_else(|| SpoolError::NotFound(format!("銷售 {id}")))
    }

    /// 刪除單筆銷售
    pub fn delete_sale(&mut self, id: Uuid) -> Result<()> {
        let index = self
            .sales
            .iter()
            .position(|sale| sale.id == id)
            .ok_or_else(|| SpoolError::NotFound(format!("銷售 {id}")))?;
        self.sales.remove(index);
        Ok(())
    }

    /// 所有銷售（插入順序）
    pub fn all_sales(&self) -> Vec<Sale> {
        self.sales.clone()
    }

    /// 所有銷售，最新在前（同時間保留插入順序）
    pub fn sales_desc(&self) -> Vec<Sale> {
        let mut sales = self.sales.clone();
        sales.sort_by(|a, b| b.date.cmp(&a.date));
        sales
    }

    /// 日期區間內的銷售（含頭尾）
    pub fn sales_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Sale> {
        self.sales
            .iter()
            .filter(|sale| sale.date >= start && sale.date <= end)
            .cloned()
            .collect()
    }

    /// 各產品的歷史銷售筆數
    pub fn sale_counts(&self) -> HashMap<ProductId, u64> {
        let mut counts = HashMap::new();
        for sale in &self.sales {
            *counts.entry(sale.product_id).or_insert(0) += 1;
        }
        counts
    }
}
