//! Typed shapes of the modeled financial event categories.
//!
//! Each shape keeps the fields the pipeline reads and captures everything else
//! in a flattened `extra` map, which is still walked for amounts so upstream
//! schema additions keep contributing to the event total.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::walker::{collect_money, find_string};

/// One amount found in an event entry.
#[derive(Debug, Clone, PartialEq)]
pub struct MoneyAmount {
    pub amount: Decimal,
    pub currency: Option<String>,
}

/// Common view over a typed event entry.
pub trait EventShape {
    fn posted_date(&self) -> Option<String>;
    fn order_id(&self) -> Option<String>;
    fn sku(&self) -> Option<String>;
    fn asin(&self) -> Option<String>;
    fn collect_amounts(&self, out: &mut Vec<MoneyAmount>);
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Money {
    #[serde(alias = "currencyCode")]
    pub currency_code: Option<String>,
    #[serde(alias = "currencyAmount")]
    pub currency_amount: Option<Value>,
}

impl Money {
    fn push_into(&self, out: &mut Vec<MoneyAmount>) {
        if let Some(amount) = self.currency_amount.as_ref().and_then(super::walker::amount_value) {
            out.push(MoneyAmount {
                amount,
                currency: self.currency_code.clone().filter(|c| !c.is_empty()),
            });
        }
    }
}

fn push_opt(money: &Option<Money>, out: &mut Vec<MoneyAmount>) {
    if let Some(m) = money {
        m.push_into(out);
    }
}

fn walk_extra(extra: &Map<String, Value>, out: &mut Vec<MoneyAmount>) {
    for value in extra.values() {
        collect_money(value, out);
    }
}

fn find_in_extra(extra: &Map<String, Value>, key: &str) -> Option<String> {
    extra.values().find_map(|v| find_string(v, key))
}

/// The typed top-level value when present, else the first nested match.
fn top_level_or_nested(
    top: &Option<String>,
    extras: &[&Map<String, Value>],
    key: &str,
) -> Option<String> {
    top.as_ref()
        .filter(|s| !s.is_empty())
        .cloned()
        .or_else(|| extras.iter().find_map(|extra| find_in_extra(extra, key)))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChargeComponent {
    pub charge_type: Option<String>,
    pub charge_amount: Option<Money>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FeeComponent {
    pub fee_type: Option<String>,
    pub fee_amount: Option<Money>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Promotion {
    pub promotion_type: Option<String>,
    pub promotion_id: Option<String>,
    pub promotion_amount: Option<Money>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DirectPayment {
    pub direct_payment_type: Option<String>,
    pub direct_payment_amount: Option<Money>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaxWithheldComponent {
    pub tax_collection_model: Option<String>,
    #[serde(default)]
    pub taxes_withheld: Vec<ChargeComponent>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn charges(list: &[ChargeComponent], out: &mut Vec<MoneyAmount>) {
    for c in list {
        push_opt(&c.charge_amount, out);
        walk_extra(&c.extra, out);
    }
}

fn fees(list: &[FeeComponent], out: &mut Vec<MoneyAmount>) {
    for f in list {
        push_opt(&f.fee_amount, out);
        walk_extra(&f.extra, out);
    }
}

fn promotions(list: &[Promotion], out: &mut Vec<MoneyAmount>) {
    for p in list {
        push_opt(&p.promotion_amount, out);
        walk_extra(&p.extra, out);
    }
}

/// A shipped (or adjusted) line inside a shipment-shaped event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShipmentItem {
    #[serde(rename = "SellerSKU")]
    pub seller_sku: Option<String>,
    pub order_item_id: Option<String>,
    pub order_adjustment_item_id: Option<String>,
    #[serde(default)]
    pub item_charge_list: Vec<ChargeComponent>,
    #[serde(default)]
    pub item_charge_adjustment_list: Vec<ChargeComponent>,
    #[serde(default)]
    pub item_fee_list: Vec<FeeComponent>,
    #[serde(default)]
    pub item_fee_adjustment_list: Vec<FeeComponent>,
    #[serde(default)]
    pub item_tax_withheld_list: Vec<TaxWithheldComponent>,
    #[serde(default)]
    pub promotion_list: Vec<Promotion>,
    #[serde(default)]
    pub promotion_adjustment_list: Vec<Promotion>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ShipmentItem {
    fn collect_amounts(&self, out: &mut Vec<MoneyAmount>) {
        charges(&self.item_charge_list, out);
        charges(&self.item_charge_adjustment_list, out);
        fees(&self.item_fee_list, out);
        fees(&self.item_fee_adjustment_list, out);
        for tax in &self.item_tax_withheld_list {
            charges(&tax.taxes_withheld, out);
            walk_extra(&tax.extra, out);
        }
        promotions(&self.promotion_list, out);
        promotions(&self.promotion_adjustment_list, out);
        walk_extra(&self.extra, out);
    }
}

/// Shape shared by shipment, refund, guarantee-claim and chargeback events.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShipmentEvent {
    pub amazon_order_id: Option<String>,
    pub seller_order_id: Option<String>,
    pub marketplace_name: Option<String>,
    pub posted_date: Option<String>,
    #[serde(default)]
    pub order_charge_list: Vec<ChargeComponent>,
    #[serde(default)]
    pub order_charge_adjustment_list: Vec<ChargeComponent>,
    #[serde(default)]
    pub shipment_fee_list: Vec<FeeComponent>,
    #[serde(default)]
    pub shipment_fee_adjustment_list: Vec<FeeComponent>,
    #[serde(default)]
    pub order_fee_list: Vec<FeeComponent>,
    #[serde(default)]
    pub order_fee_adjustment_list: Vec<FeeComponent>,
    #[serde(default)]
    pub direct_payment_list: Vec<DirectPayment>,
    #[serde(default)]
    pub shipment_item_list: Vec<ShipmentItem>,
    #[serde(default)]
    pub shipment_item_adjustment_list: Vec<ShipmentItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventShape for ShipmentEvent {
    fn posted_date(&self) -> Option<String> {
        let mut extras = vec![&self.extra];
        extras.extend(
            self.shipment_item_list
                .iter()
                .chain(self.shipment_item_adjustment_list.iter())
                .map(|item| &item.extra),
        );
        extras.extend(self.direct_payment_list.iter().map(|p| &p.extra));
        top_level_or_nested(&self.posted_date, &extras, "PostedDate")
    }

    fn order_id(&self) -> Option<String> {
        self.amazon_order_id.clone()
    }

    fn sku(&self) -> Option<String> {
        self.shipment_item_adjustment_list
            .iter()
            .chain(self.shipment_item_list.iter())
            .find_map(|item| item.seller_sku.clone())
            .or_else(|| find_in_extra(&self.extra, "SellerSKU"))
    }

    fn asin(&self) -> Option<String> {
        find_in_extra(&self.extra, "ASIN")
    }

    fn collect_amounts(&self, out: &mut Vec<MoneyAmount>) {
        charges(&self.order_charge_list, out);
        charges(&self.order_charge_adjustment_list, out);
        fees(&self.shipment_fee_list, out);
        fees(&self.shipment_fee_adjustment_list, out);
        fees(&self.order_fee_list, out);
        fees(&self.order_fee_adjustment_list, out);
        for payment in &self.direct_payment_list {
            push_opt(&payment.direct_payment_amount, out);
            walk_extra(&payment.extra, out);
        }
        for item in &self.shipment_item_list {
            item.collect_amounts(out);
        }
        for item in &self.shipment_item_adjustment_list {
            item.collect_amounts(out);
        }
        walk_extra(&self.extra, out);
    }
}

/// A fee charged outside of a shipment (subscription, FBA storage, ...).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceFeeEvent {
    pub amazon_order_id: Option<String>,
    pub fee_reason: Option<String>,
    #[serde(default)]
    pub fee_list: Vec<FeeComponent>,
    #[serde(rename = "SellerSKU")]
    pub seller_sku: Option<String>,
    #[serde(rename = "FnSKU")]
    pub fn_sku: Option<String>,
    pub fee_description: Option<String>,
    #[serde(rename = "ASIN")]
    pub asin: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventShape for ServiceFeeEvent {
    fn posted_date(&self) -> Option<String> {
        find_in_extra(&self.extra, "PostedDate")
    }

    fn order_id(&self) -> Option<String> {
        self.amazon_order_id.clone()
    }

    fn sku(&self) -> Option<String> {
        self.seller_sku.clone()
    }

    fn asin(&self) -> Option<String> {
        self.asin.clone()
    }

    fn collect_amounts(&self, out: &mut Vec<MoneyAmount>) {
        fees(&self.fee_list, out);
        walk_extra(&self.extra, out);
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AdjustmentItem {
    pub per_unit_amount: Option<Money>,
    pub total_amount: Option<Money>,
    #[serde(rename = "SellerSKU")]
    pub seller_sku: Option<String>,
    #[serde(rename = "FnSKU")]
    pub fn_sku: Option<String>,
    pub product_description: Option<String>,
    #[serde(rename = "ASIN")]
    pub asin: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Inventory reimbursements and other account-level adjustments.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AdjustmentEvent {
    pub adjustment_type: Option<String>,
    pub posted_date: Option<String>,
    pub adjustment_amount: Option<Money>,
    #[serde(default)]
    pub adjustment_item_list: Vec<AdjustmentItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventShape for AdjustmentEvent {
    fn posted_date(&self) -> Option<String> {
        let mut extras = vec![&self.extra];
        extras.extend(self.adjustment_item_list.iter().map(|item| &item.extra));
        top_level_or_nested(&self.posted_date, &extras, "PostedDate")
    }

    fn order_id(&self) -> Option<String> {
        find_in_extra(&self.extra, "AmazonOrderId")
    }

    fn sku(&self) -> Option<String> {
        self.adjustment_item_list
            .iter()
            .find_map(|item| item.seller_sku.clone())
    }

    fn asin(&self) -> Option<String> {
        self.adjustment_item_list
            .iter()
            .find_map(|item| item.asin.clone())
    }

    fn collect_amounts(&self, out: &mut Vec<MoneyAmount>) {
        push_opt(&self.adjustment_amount, out);
        for item in &self.adjustment_item_list {
            push_opt(&item.per_unit_amount, out);
            push_opt(&item.total_amount, out);
            walk_extra(&item.extra, out);
        }
        walk_extra(&self.extra, out);
    }
}

/// Sponsored-products invoice charge. This category is camelCase upstream.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAdsPaymentEvent {
    pub posted_date: Option<String>,
    pub transaction_type: Option<String>,
    pub invoice_id: Option<String>,
    pub base_value: Option<Money>,
    pub tax_value: Option<Money>,
    pub transaction_value: Option<Money>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventShape for ProductAdsPaymentEvent {
    fn posted_date(&self) -> Option<String> {
        top_level_or_nested(&self.posted_date, &[&self.extra], "PostedDate")
    }

    fn order_id(&self) -> Option<String> {
        None
    }

    fn sku(&self) -> Option<String> {
        None
    }

    fn asin(&self) -> Option<String> {
        None
    }

    fn collect_amounts(&self, out: &mut Vec<MoneyAmount>) {
        push_opt(&self.base_value, out);
        push_opt(&self.tax_value, out);
        push_opt(&self.transaction_value, out);
        walk_extra(&self.extra, out);
    }
}
