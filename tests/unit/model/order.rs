use std::str::FromStr;

use rust_decimal::Decimal;

use delivery_staff::adapter::thirdparty::{parse_order_list, FetchError};
use delivery_staff::api::dto::{OrderDto, OrderItemPayDto};
use delivery_staff::model::{
    count_by_status, filter_by_status, OrderDirectory, OrderFilter, OrderModel, OrderModelError,
    OrderStatus,
};

use crate::ut_order_directory;

fn ut_order_dto(raw: &str) -> OrderDto {
    serde_json::from_str::<OrderDto>(raw).unwrap()
}

#[test]
fn convert_from_dto_ok() {
    let dir = ut_order_directory();
    assert_eq!(dir.orders().len(), 3);
    let order = dir.find("1").unwrap();
    assert_eq!(order.customer_name.as_str(), "Aiko Tanaka");
    assert_eq!(order.status(), OrderStatus::ToBeDelivered);
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[1].quantity, 3);
    assert_eq!(order.items[1].amount(), Decimal::new(36, 1));
    assert_eq!(order.total_amount, Decimal::new(1060, 2));
    assert_eq!(order.items_total(), order.total_amount);
    let order = dir.find("2").unwrap();
    assert_eq!(order.status(), OrderStatus::Delivered);
    assert!(dir.find("99").is_none());
}

#[test]
fn convert_from_dto_missing_ordernum() {
    let dto = ut_order_dto(r#"{"Name":"x", "Status":"Delivered", "items":[]}"#);
    let result = OrderModel::try_from(dto);
    assert_eq!(result.err(), Some(OrderModelError::MissingOrderNumber));
    let dto = ut_order_dto(r#"{"ordernum":" ", "Status":"Delivered"}"#);
    let result = OrderModel::try_from(dto);
    assert_eq!(result.err(), Some(OrderModelError::MissingOrderNumber));
}

#[test]
fn convert_from_dto_unknown_status() {
    let dto = ut_order_dto(r#"{"ordernum":5, "Status":"Cancelled"}"#);
    let result = OrderModel::try_from(dto);
    assert!(matches!(
        result.err(),
        Some(OrderModelError::UnknownStatus(n, s)) if n == "5" && s == "Cancelled"
    ));
}

#[test]
fn convert_from_dto_item_errors() {
    let dto = ut_order_dto(
        r#"{"ordernum":5, "Status":"To be Delivered",
        "items":[{"name":"tea", "quantity":0, "price":"1.0"}]}"#,
    );
    let result = OrderModel::try_from(dto);
    assert!(matches!(result.err(), Some(OrderModelError::ZeroQuantity(..))));
    let dto = ut_order_dto(
        r#"{"ordernum":5, "Status":"To be Delivered",
        "items":[{"name":"tea", "quantity":2, "price":"-1.0"}]}"#,
    );
    let result = OrderModel::try_from(dto);
    assert!(matches!(
        result.err(),
        Some(OrderModelError::NegativeAmount(_, "price"))
    ));
    let dto = ut_order_dto(
        r#"{"ordernum":5, "Status":"To be Delivered",
        "items":[{"name":"tea", "quantity":2, "price":"1.5", "amount":"3.5"}]}"#,
    );
    let result = OrderModel::try_from(dto);
    assert!(matches!(
        result.err(),
        Some(OrderModelError::AmountMismatch(n, item)) if n == "5" && item == "tea"
    ));
    let dto = ut_order_dto(
        r#"{"ordernum":5, "Status":"To be Delivered",
        "items":[{"name":"tea", "quantity":"two", "price":"1.5"}]}"#,
    );
    let result = OrderModel::try_from(dto);
    assert!(matches!(
        result.err(),
        Some(OrderModelError::InvalidNumber { field: "quantity", .. })
    ));
}

#[test]
fn convert_from_dto_amount_overflow() {
    let dto = ut_order_dto(
        r#"{"ordernum":5, "Status":"To be Delivered",
        "items":[{"name":"gold", "quantity":2, "price":"79228162514264337593543950335"}]}"#,
    );
    let result = OrderModel::try_from(dto);
    assert!(matches!(
        result.err(),
        Some(OrderModelError::InvalidNumber { field: "amount", .. })
    ));
    // each item fits, their sum does not
    let dto = ut_order_dto(
        r#"{"ordernum":5, "Status":"To be Delivered", "items":[
        {"name":"gold", "quantity":1, "price":"79228162514264337593543950335"},
        {"name":"silver", "quantity":1, "price":"1"}
        ]}"#,
    );
    let result = OrderModel::try_from(dto);
    assert!(matches!(
        result.err(),
        Some(OrderModelError::InvalidNumber { field: "items", .. })
    ));
    let raw = br#"{"success":true, "orders":[{"ordernum":5, "Status":"To be Delivered",
        "items":[{"name":"gold", "quantity":2, "price":"79228162514264337593543950335"}]}]}"#;
    let result = parse_order_list(raw);
    assert!(matches!(result.err(), Some(FetchError::MalformedPayload(_))));
}

#[test]
fn convert_from_dto_missing_total() {
    let dto = ut_order_dto(r#"{"ordernum":"A12", "Status":"To be Delivered"}"#);
    let order = OrderModel::try_from(dto).unwrap();
    assert_eq!(order.ordernum.as_str(), "A12");
    assert!(order.total_amount.is_zero());
    assert!(order.address.is_empty());
}

#[test]
fn filter_stable_subset() {
    let dir = ut_order_directory();
    let all = filter_by_status(dir.orders(), OrderFilter::All);
    assert_eq!(all.as_slice(), dir.orders());
    let pending = dir.filter_by_status(OrderFilter::ToBeDelivered);
    let nums = pending.iter().map(|o| o.ordernum.as_str()).collect::<Vec<_>>();
    assert_eq!(nums, vec!["1", "7"]);
    let delivered = dir.filter_by_status(OrderFilter::Delivered);
    let nums = delivered.iter().map(|o| o.ordernum.as_str()).collect::<Vec<_>>();
    assert_eq!(nums, vec!["2"]);
    [OrderStatus::ToBeDelivered, OrderStatus::Delivered]
        .into_iter()
        .map(|s| {
            let expect = filter_by_status(dir.orders(), OrderFilter::from(s)).len();
            assert_eq!(count_by_status(dir.orders(), s), expect);
        })
        .count();
}

#[test]
fn count_pending_two_orders() {
    let raw = r#"[
        {"ordernum":1, "Status":"To be Delivered"},
        {"ordernum":2, "Status":"Delivered"}
    ]"#;
    let dtos = serde_json::from_str::<Vec<OrderDto>>(raw).unwrap();
    let dir = OrderDirectory::try_from(dtos).unwrap();
    assert_eq!(dir.count_by_status(OrderStatus::ToBeDelivered), 1);
    assert_eq!(dir.count_by_status(OrderStatus::Delivered), 1);
}

#[test]
fn empty_directory() {
    let dir = OrderDirectory::default();
    assert!(dir.is_empty());
    assert!(dir.filter_by_status(OrderFilter::All).is_empty());
    assert_eq!(dir.count_by_status(OrderStatus::ToBeDelivered), 0);
}

#[test]
fn filter_parse_from_text() {
    assert_eq!(OrderFilter::from_str("ALL"), Ok(OrderFilter::All));
    assert_eq!(OrderFilter::from_str("pending"), Ok(OrderFilter::ToBeDelivered));
    assert_eq!(
        OrderFilter::from_str("To be Delivered"),
        Ok(OrderFilter::ToBeDelivered)
    );
    assert_eq!(OrderFilter::from_str(" delivered "), Ok(OrderFilter::Delivered));
    assert!(OrderFilter::from_str("cancelled").is_err());
    assert_eq!(OrderStatus::Delivered.label(), "Delivered");
}

#[test]
fn item_to_payment_dto() {
    let dir = ut_order_directory();
    let order = dir.find("1").unwrap();
    let dto = OrderItemPayDto::from(&order.items[0]);
    let serial = serde_json::to_value(&dto).unwrap();
    assert_eq!(serial["name"].as_str(), Some("Green Tea"));
    assert_eq!(serial["quantity"].as_u64(), Some(2));
    assert_eq!(serial["price"].as_f64(), Some(3.5));
    assert_eq!(serial["amount"].as_f64(), Some(7.0));
}
