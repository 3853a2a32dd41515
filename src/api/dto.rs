use serde::{Deserialize, Serialize};
use serde_json::Number as JsnNum;

/// The backend is inconsistent on numeric fields, some of them are
/// JSON numbers, the others are numeric strings
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(untagged)]
pub enum JsnNumOrStr {
    Num(JsnNum),
    Str(String),
}

impl JsnNumOrStr {
    pub fn to_text(&self) -> String {
        match self {
            Self::Num(n) => n.to_string(),
            Self::Str(s) => s.trim().to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct OrderItemDto {
    pub name: String,
    pub quantity: JsnNumOrStr,
    pub price: JsnNumOrStr,
    pub amount: Option<JsnNumOrStr>,
}

#[derive(Deserialize, Debug)]
pub struct OrderDto {
    pub ordernum: Option<JsnNumOrStr>,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Address")]
    pub address: Option<String>,
    #[serde(rename = "Mobile")]
    pub mobile: Option<String>,
    #[serde(rename = "Email")]
    pub email: Option<String>,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(default)]
    pub items: Vec<OrderItemDto>,
    #[serde(rename = "totalAmount")]
    pub total_amount: Option<JsnNumOrStr>,
}

#[derive(Deserialize, Debug)]
pub struct OrderListRespDto {
    pub success: bool,
    #[serde(default)]
    pub orders: Vec<OrderDto>,
    pub error: Option<String>,
}

/// serialised into the multipart field `order_items`
#[derive(Serialize, Debug)]
pub struct OrderItemPayDto {
    pub name: String,
    pub quantity: u32,
    pub price: JsnNum,
    pub amount: JsnNum,
}

/// structured body of payment endpoint, the legacy plain-text body is
/// still accepted, see `adapter::thirdparty::parse_payment_response`
#[derive(Deserialize, Debug)]
pub struct PaymentRespDto {
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct LoginReqDto<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Serialize, Debug)]
pub struct GeocodeQueryDto<'a> {
    pub address: &'a str,
    pub key: &'a str,
}

#[derive(Deserialize, Debug)]
pub struct GeocodeLocationDto {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Deserialize, Debug)]
pub struct GeocodeGeometryDto {
    pub location: Option<GeocodeLocationDto>,
}

#[derive(Deserialize, Debug)]
pub struct GeocodeResultDto {
    pub geometry: Option<GeocodeGeometryDto>,
}

#[derive(Deserialize, Debug)]
pub struct GeocodeRespDto {
    #[serde(default)]
    pub results: Vec<GeocodeResultDto>,
    pub status: Option<String>,
}

/// the endpoint replies either an error object or the user record, the
/// error variant has to be tried first since every field of the record
/// is optional
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum LoginRespDto {
    Failure { error: String },
    Record(StaffRecordDto),
}

/// user record from login endpoint, other columns are discarded
#[derive(Deserialize, Debug)]
pub struct StaffRecordDto {
    pub id: Option<JsnNumOrStr>,
    pub username: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub role: Option<JsnNumOrStr>,
}
