use std::result::Result;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::api::dto::{JsnNumOrStr, OrderDto, OrderItemDto, OrderItemPayDto};
use crate::constant::order_status as status_label;

#[derive(Debug, Clone, PartialEq)]
pub enum OrderModelError {
    MissingOrderNumber,
    UnknownStatus(String, String), // order number, given status label
    ZeroQuantity(String, String),  // order number, item name
    InvalidNumber {
        ordernum: String,
        field: &'static str,
        raw: String,
    },
    NegativeAmount(String, &'static str),
    AmountMismatch(String, String), // order number, item name
    OrderNotFound(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    ToBeDelivered,
    Delivered,
}

/// status predicate applied to the order list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderFilter {
    All,
    ToBeDelivered,
    Delivered,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemModel {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    // quantity times unit price, checked once at conversion
    amount: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderModel {
    pub ordernum: String,
    pub customer_name: String,
    pub address: String,
    pub mobile: String,
    pub email: String,
    pub items: Vec<OrderItemModel>,
    pub total_amount: Decimal,
    items_total: Decimal,
    // private, only a confirmed payment moves it forward
    status: OrderStatus,
}

/// Full order set fetched from the backend, the single source of truth of
/// the workflow. Filtered views are always derived from it.
#[derive(Debug, Clone, Default)]
pub struct OrderDirectory {
    orders: Vec<OrderModel>,
}

impl OrderStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ToBeDelivered => status_label::TO_BE_DELIVERED,
            Self::Delivered => status_label::DELIVERED,
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            status_label::TO_BE_DELIVERED => Ok(Self::ToBeDelivered),
            status_label::DELIVERED => Ok(Self::Delivered),
            _others => Err(s.to_string()),
        }
    }
}

impl OrderFilter {
    pub fn matches(&self, status: OrderStatus) -> bool {
        match self {
            Self::All => true,
            Self::ToBeDelivered => status == OrderStatus::ToBeDelivered,
            Self::Delivered => status == OrderStatus::Delivered,
        }
    }
}

impl From<OrderStatus> for OrderFilter {
    fn from(value: OrderStatus) -> Self {
        match value {
            OrderStatus::ToBeDelivered => Self::ToBeDelivered,
            OrderStatus::Delivered => Self::Delivered,
        }
    }
}

impl FromStr for OrderFilter {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "pending" | "to-be-delivered" | "to be delivered" => Ok(Self::ToBeDelivered),
            "delivered" => Ok(Self::Delivered),
            _others => Err(s.to_string()),
        }
    }
}

fn parse_decimal(
    ordernum: &str,
    field: &'static str,
    raw: &JsnNumOrStr,
) -> Result<Decimal, OrderModelError> {
    let txt = raw.to_text();
    let value = Decimal::from_str(txt.as_str())
        .or_else(|_e| Decimal::from_scientific(txt.as_str()))
        .map_err(|_e| OrderModelError::InvalidNumber {
            ordernum: ordernum.to_string(),
            field,
            raw: txt.clone(),
        })?;
    if value.is_sign_negative() && !value.is_zero() {
        Err(OrderModelError::NegativeAmount(ordernum.to_string(), field))
    } else {
        Ok(value)
    }
}

fn overflowed(
    ordernum: &str,
    field: &'static str,
    lhs: Decimal,
    rhs: Decimal,
) -> OrderModelError {
    OrderModelError::InvalidNumber {
        ordernum: ordernum.to_string(),
        field,
        raw: format!("{lhs} overflow with {rhs}"),
    }
}

impl OrderItemModel {
    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

impl TryFrom<(&str, OrderItemDto)> for OrderItemModel {
    type Error = OrderModelError;
    fn try_from(value: (&str, OrderItemDto)) -> Result<Self, Self::Error> {
        let (ordernum, dto) = value;
        let OrderItemDto {
            name,
            quantity,
            price,
            amount,
        } = dto;
        let qty_txt = quantity.to_text();
        let quantity = qty_txt
            .parse::<u32>()
            .map_err(|_e| OrderModelError::InvalidNumber {
                ordernum: ordernum.to_string(),
                field: "quantity",
                raw: qty_txt.clone(),
            })?;
        if quantity == 0 {
            return Err(OrderModelError::ZeroQuantity(ordernum.to_string(), name));
        }
        let unit_price = parse_decimal(ordernum, "price", &price)?;
        let qty_d = Decimal::from(quantity);
        let calculated = unit_price
            .checked_mul(qty_d)
            .ok_or_else(|| overflowed(ordernum, "amount", unit_price, qty_d))?;
        let item = Self {
            name,
            quantity,
            unit_price,
            amount: calculated,
        };
        // the amount from backend is optional, once given it must not diverge
        // from quantity and unit price
        if let Some(a) = amount.as_ref() {
            let given = parse_decimal(ordernum, "amount", a)?;
            if given != item.amount() {
                return Err(OrderModelError::AmountMismatch(
                    ordernum.to_string(),
                    item.name,
                ));
            }
        }
        Ok(item)
    } // end of fn try-from
} // end of impl OrderItemModel

impl From<&OrderItemModel> for OrderItemPayDto {
    fn from(value: &OrderItemModel) -> Self {
        // `Decimal` text is always a valid JSON number
        let to_jsn_num = |d: Decimal| {
            serde_json::Number::from_str(d.normalize().to_string().as_str())
                .unwrap_or_else(|_e| serde_json::Number::from(0u32))
        };
        Self {
            name: value.name.clone(),
            quantity: value.quantity,
            price: to_jsn_num(value.unit_price),
            amount: to_jsn_num(value.amount()),
        }
    }
}

impl TryFrom<OrderDto> for OrderModel {
    type Error = OrderModelError;
    fn try_from(value: OrderDto) -> Result<Self, Self::Error> {
        let OrderDto {
            ordernum,
            name,
            address,
            mobile,
            email,
            status,
            items,
            total_amount,
        } = value;
        let ordernum = ordernum
            .map(|v| v.to_text())
            .filter(|v| !v.is_empty())
            .ok_or(OrderModelError::MissingOrderNumber)?;
        let status = OrderStatus::from_str(status.as_str())
            .map_err(|raw| OrderModelError::UnknownStatus(ordernum.clone(), raw))?;
        let items = items
            .into_iter()
            .map(|d| OrderItemModel::try_from((ordernum.as_str(), d)))
            .collect::<Result<Vec<_>, OrderModelError>>()?;
        let items_total = items.iter().try_fold(Decimal::ZERO, |acc, item| {
            acc.checked_add(item.amount())
                .ok_or_else(|| overflowed(ordernum.as_str(), "items", acc, item.amount()))
        })?;
        let total_amount = match total_amount.as_ref() {
            Some(t) => parse_decimal(ordernum.as_str(), "totalAmount", t)?,
            None => Decimal::ZERO,
        };
        Ok(Self {
            ordernum,
            customer_name: name.unwrap_or_default(),
            address: address.unwrap_or_default(),
            mobile: mobile.unwrap_or_default(),
            email: email.unwrap_or_default(),
            items,
            total_amount,
            items_total,
            status,
        })
    } // end of fn try-from
} // end of impl OrderModel

impl OrderModel {
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn items_total(&self) -> Decimal {
        self.items_total
    }

    // forward-only, a delivered order stays delivered
    pub(crate) fn mark_delivered(&mut self) {
        self.status = OrderStatus::Delivered;
    }
}

/// stable filter, relative order of the given set is preserved
pub fn filter_by_status(set: &[OrderModel], predicate: OrderFilter) -> Vec<OrderModel> {
    set.iter()
        .filter(|o| predicate.matches(o.status()))
        .cloned()
        .collect()
}

pub fn count_by_status(set: &[OrderModel], status: OrderStatus) -> usize {
    set.iter().filter(|o| o.status() == status).count()
}

impl TryFrom<Vec<OrderDto>> for OrderDirectory {
    type Error = OrderModelError;
    fn try_from(value: Vec<OrderDto>) -> Result<Self, Self::Error> {
        let orders = value
            .into_iter()
            .map(OrderModel::try_from)
            .collect::<Result<Vec<_>, OrderModelError>>()?;
        Ok(Self { orders })
    }
}

impl OrderDirectory {
    pub fn new(orders: Vec<OrderModel>) -> Self {
        Self { orders }
    }
    pub fn orders(&self) -> &[OrderModel] {
        &self.orders
    }
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
    pub fn find(&self, ordernum: &str) -> Option<&OrderModel> {
        self.orders.iter().find(|o| o.ordernum == ordernum)
    }
    pub fn filter_by_status(&self, predicate: OrderFilter) -> Vec<OrderModel> {
        filter_by_status(&self.orders, predicate)
    }
    pub fn count_by_status(&self, status: OrderStatus) -> usize {
        count_by_status(&self.orders, status)
    }

    pub(crate) fn mark_delivered(&mut self, ordernum: &str) -> Result<(), OrderModelError> {
        self.orders
            .iter_mut()
            .find(|o| o.ordernum == ordernum)
            .map(OrderModel::mark_delivered)
            .ok_or(OrderModelError::OrderNotFound(ordernum.to_string()))
    }
} // end of impl OrderDirectory
