pub mod env_vars {
    pub const SYS_BASEPATH: &str = "SYS_BASE_PATH";
    pub const SERVICE_BASEPATH: &str = "SERVICE_BASE_PATH";
    // relative path starting from app / service home folder
    pub const CFG_FILEPATH: &str = "CONFIG_FILE_PATH";
    pub const EXPECTED_LABELS: [&str; 3] = [SYS_BASEPATH, SERVICE_BASEPATH, CFG_FILEPATH];
}

pub mod logging {
    use serde::Deserialize;

    #[allow(clippy::upper_case_acronyms)]
    #[derive(Deserialize)]
    pub enum Level {
        TRACE,
        DEBUG,
        INFO,
        WARNING,
        ERROR,
        FATAL,
    }

    #[allow(clippy::upper_case_acronyms)]
    #[derive(Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Destination {
        CONSOLE,
        LOCALFS,
    }
}

pub mod backend {
    pub const GET_ORDERS: &str = "/getorders.php";
    pub const SAVE_PAYMENT: &str = "/savepayment.php";
    pub const LOGIN: &str = "/login.php";
    // legacy plain-text body of payment endpoint contains this literal
    // substring on success
    pub const PAYMENT_SUCCESS_MARKER: &str = "success:true";
    // role flag of user record, only staff can use this application
    pub const STAFF_ROLE_FLAG: u8 = 2;
    pub mod multipart {
        pub const ORDER_NUM: &str = "ordernum";
        pub const NAME: &str = "name";
        pub const ADDRESS: &str = "address";
        pub const MOBILE: &str = "mobile";
        pub const ORDER_ITEMS: &str = "order_items";
        pub const TOTAL_AMOUNT: &str = "totalAmount";
        pub const IMAGE: &str = "image";
    }
}

pub mod geocode {
    pub const RESOURCE_PATH: &str = "/maps/api/geocode/json";
}

pub mod order_status {
    pub const TO_BE_DELIVERED: &str = "To be Delivered";
    pub const DELIVERED: &str = "Delivered";
}

pub mod receipt {
    pub const DEFAULT_FILE_STEM: &str = "image";
    pub const JPEG_MEDIA_TYPE: &str = "image/jpeg";
}

/// Text of notifications surfaced to staff
pub mod message {
    pub const TITLE_ERROR: &str = "Error";
    pub const TITLE_SUCCESS: &str = "Success";
    pub const TITLE_PERMISSION_DENIED: &str = "Permission Denied";

    pub const FETCH_ORDERS_TRANSPORT: &str = "An error occurred while fetching orders";
    pub const FETCH_ORDERS_REJECTED: &str = "Unable to fetch orders";
    pub const FETCH_ORDERS_MALFORMED: &str = "Failed to fetch orders";
    pub const LOCATION_DENIED: &str = "You need to grant location access to use this feature.";
    pub const LOCATION_UNAVAILABLE: &str = "Unable to fetch current location";
    pub const GEOCODE_NOT_FOUND: &str = "Unable to fetch coordinates for this address";
    pub const GEOCODE_UNAVAILABLE: &str = "Failed to fetch coordinates";
    pub const RECEIPT_PICK_FAILURE: &str = "Error selecting image. Please try again.";
    pub const PAYMENT_SAVED: &str = "Payment successfully saved and order marked as delivered!";
    pub const PAYMENT_REJECTED: &str =
        "Failed to process payment and update order status. Please try again.";
    pub const PAYMENT_TRANSPORT: &str = "Error processing payment. Please try again.";
    pub const PAYMENT_INVALID_ORDER: &str = "The order cannot be confirmed, order data is invalid.";
    pub const LOGIN_MISSING_INPUT: &str = "Please enter both username and password.";
    pub const LOGIN_STAFF_ONLY: &str = "Only staff can log in.";
}
