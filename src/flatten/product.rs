use serde::Serialize;

/// One row of the silver layer
///
/// Field order is the CSV column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlatProduct {
    pub product_id: Option<String>,
    pub profile_id: Option<String>,
    pub userid: Option<String>,
    pub product_name: Option<String>,
    pub co_name: Option<String>,
    pub prod_url: String,
    pub profile_url: String,
    pub main_category: String,
    pub sub_category: String,
    pub member_since: Option<String>,
    pub year_established: Option<String>,
    pub has_trust_stamp: Option<String>,
    pub trust_stamp_url: Option<String>,
    pub certifications: Option<String>,
    pub last_verified: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country_name: Option<String>,
    pub is_manufacturer: Option<String>,
    pub is_distributor: Option<String>,
    pub is_supplier: Option<String>,
    pub is_exporter: Option<String>,
    pub is_trader: Option<String>,
    pub is_service_provider: Option<String>,
    pub supply_ability: Option<String>,
    pub delivery_time: Option<String>,
    pub price_string: Option<String>,
    pub price_numeric: Option<String>,
    pub price_range: Option<String>,
    pub min_price_range: Option<String>,
    pub max_price_range: Option<String>,
    pub product_description: Option<String>,
    pub keywords: Option<String>,
    pub price_from_sub_json: Option<String>,
    pub minimum_order_quantity: Option<String>,
    pub payment_terms: Option<String>,
    pub buyer_feedback_score: Option<String>,
    pub in_stock: Option<String>,
    pub made_in_india: Option<String>,
}

impl FlatProduct {
    /// Column names, in serialization order
    pub const FIELDS: [&'static str; 39] = [
        "product_id",
        "profile_id",
        "userid",
        "product_name",
        "co_name",
        "prod_url",
        "profile_url",
        "main_category",
        "sub_category",
        "member_since",
        "year_established",
        "has_trust_stamp",
        "trust_stamp_url",
        "certifications",
        "last_verified",
        "city",
        "state",
        "country_name",
        "is_manufacturer",
        "is_distributor",
        "is_supplier",
        "is_exporter",
        "is_trader",
        "is_service_provider",
        "supply_ability",
        "delivery_time",
        "price_string",
        "price_numeric",
        "price_range",
        "min_price_range",
        "max_price_range",
        "product_description",
        "keywords",
        "price_from_sub_json",
        "minimum_order_quantity",
        "payment_terms",
        "buyer_feedback_score",
        "in_stock",
        "made_in_india",
    ];
}
