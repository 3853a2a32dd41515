use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::result::Result;
use std::str::FromStr;

use tokio::runtime::Builder as RuntimeBuilder;

use delivery_staff::adapter::device::LocalFsImagePicker;
use delivery_staff::constant::env_vars::EXPECTED_LABELS;
use delivery_staff::hard_limit;
use delivery_staff::logging::{app_log_event, AppLogContext, AppLogLevel};
use delivery_staff::model::OrderFilter;
use delivery_staff::usecase::StaffLoginUseCase;
use delivery_staff::workflow::{Notification, WorkflowController, WorkflowError};
use delivery_staff::{AppCfgHardLimit, AppCfgInitArgs, AppConfig, AppSharedState};

#[derive(Default)]
struct CliArgs {
    ordernum: Option<String>,
    receipt: Option<PathBuf>,
    filter: Option<OrderFilter>,
    username: Option<String>,
    password: Option<String>,
}

const USAGE: &str = "usage: staff_cli [--filter all|pending|delivered] \
    [--order <num> [--receipt <path>]] [--username <name> --password <secret>]";

fn parse_args(mut raw: impl Iterator<Item = String>) -> Result<CliArgs, String> {
    let mut out = CliArgs::default();
    while let Some(flag) = raw.next() {
        let mut value = || raw.next().ok_or(format!("missing value of {flag}"));
        match flag.as_str() {
            "--order" => out.ordernum = Some(value()?),
            "--receipt" => out.receipt = Some(PathBuf::from(value()?)),
            "--filter" => {
                let v = value()?;
                out.filter = Some(OrderFilter::from_str(v.as_str())
                    .map_err(|v| format!("unknown filter: {v}"))?);
            }
            "--username" => out.username = Some(value()?),
            "--password" => out.password = Some(value()?),
            _others => return Err(format!("unknown argument: {flag}")),
        }
    }
    if out.receipt.is_some() && out.ordernum.is_none() {
        Err("--receipt requires --order".to_string())
    } else {
        Ok(out)
    }
}

fn print_notifications(items: Vec<Notification>) {
    for n in items {
        println!("[{:?}] {}: {}", n.level, n.title, n.message);
    }
}

async fn submit_receipt(ctrl: &mut WorkflowController) -> Result<(), WorkflowError> {
    ctrl.open_payment()?;
    ctrl.pick_receipt().await?;
    ctrl.confirm_payment().await
}

async fn run_session(shr_state: AppSharedState, args: CliArgs) {
    let logctx = shr_state.log_context().clone();
    if let (Some(u), Some(p)) = (args.username.as_ref(), args.password.as_ref()) {
        let uc = StaffLoginUseCase {
            backend: shr_state.backend(),
            logctx: logctx.clone(),
        };
        match uc.execute(u.as_str(), p.as_str()).await {
            Ok(profile) => println!("Welcome, {}", profile.name),
            Err(e) => {
                println!("login failed: {:?}", e);
                return;
            }
        }
    }
    let picker = LocalFsImagePicker::new(args.receipt.clone());
    let services = shr_state.workflow_services(Box::new(picker));
    let mut ctrl = WorkflowController::new(services);
    ctrl.start_session().await;
    if let Some(f) = args.filter {
        ctrl.apply_filter(f);
    }
    for o in ctrl.visible_orders() {
        println!(
            "{} | {} | {} | {} | {}",
            o.ordernum,
            o.customer_name,
            o.address,
            o.status().label(),
            o.total_amount
        );
    }
    println!("pending deliveries: {}", ctrl.pending_delivery_count());
    print_notifications(ctrl.take_notifications());

    let ordernum = if let Some(n) = args.ordernum.as_ref() {
        n.as_str()
    } else {
        return;
    };
    if let Err(e) = ctrl.select_order(ordernum) {
        println!("cannot select order {ordernum}: {:?}", e);
        return;
    }
    if let Err(e) = ctrl.request_route().await {
        app_log_event!(logctx, AppLogLevel::WARNING, "route request, {:?}", e);
    }
    match ctrl.route() {
        Some(r) => println!(
            "route (straight line, not navigable): ({}, {}) -> ({}, {})",
            r.origin.latitude(),
            r.origin.longitude(),
            r.destination.latitude(),
            r.destination.longitude()
        ),
        None => println!("route unavailable"),
    }
    print_notifications(ctrl.take_notifications());

    if args.receipt.is_none() {
        return;
    }
    if let Err(e) = submit_receipt(&mut ctrl).await {
        println!("payment not submitted: {:?}", e);
    }
    print_notifications(ctrl.take_notifications());
    if let Some(o) = ctrl.state().directory().find(ordernum) {
        println!("order {} status: {}", o.ordernum, o.status().label());
    }
} // end of fn run_session

fn main() {
    let args = match parse_args(env::args().skip(1)) {
        Ok(a) => a,
        Err(e) => {
            println!("{e}\n{USAGE}");
            return;
        }
    };
    let iter = env::vars().filter(|(k, _v)| EXPECTED_LABELS.contains(&k.as_str()));
    let env_var_map: HashMap<String, String, RandomState> = HashMap::from_iter(iter);
    let cfg_args = AppCfgInitArgs {
        env_var_map,
        limit: AppCfgHardLimit {
            max_timeout_secs: hard_limit::MAX_TIMEOUT_SECS,
            max_receipt_width: hard_limit::MAX_RECEIPT_WIDTH,
        },
    };
    let cfg = match AppConfig::new(cfg_args) {
        Ok(c) => c,
        Err(e) => {
            println!("app failed to load config, error code: {:?} ", e);
            return;
        }
    };
    let log_ctx = AppLogContext::new(&cfg.basepath, &cfg.staff_app.logging);
    let shr_state = match AppSharedState::new(cfg, log_ctx) {
        Ok(s) => s,
        Err(e) => {
            println!("app failed to init shared state, {}", e);
            return;
        }
    };
    // every mutation happens on single control thread
    let result = RuntimeBuilder::new_current_thread()
        .enable_io()
        .enable_time()
        .build();
    match result {
        Ok(rt) => rt.block_on(run_session(shr_state, args)),
        Err(e) => {
            let log_ctx_p = shr_state.log_context();
            app_log_event!(log_ctx_p, AppLogLevel::ERROR, "async runtime failed to build, {} ", e);
        }
    }
} // end of fn main
