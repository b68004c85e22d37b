use std::process::ExitCode;
use std::sync::Arc;

use chrono::NaiveDate;
use nuzul_app::{init_tracing, session, Session};
use nuzul_cart::models::AddRoom;
use nuzul_catalog::pricing::PriceRating;
use nuzul_catalog::room::RoomDetails;
use nuzul_checkout::amount::PaymentOption;
use nuzul_checkout::mock::{RecordingGateway, ScriptedWallet};
use nuzul_checkout::orchestrator::{
    CheckoutForm, CheckoutOrchestrator, CheckoutOutcome, CheckoutPhase, ReservationContext,
};
use nuzul_core::analytics::TracingAnalytics;
use nuzul_core::notify::TracingNotifier;
use nuzul_core::wallet::WalletEvent;
use nuzul_shared::locale::Language;
use nuzul_store::app_config::Config;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid demo date")
}

fn demo_room(id: &str, rating: PriceRating) -> AddRoom {
    AddRoom {
        id: id.to_string(),
        room: RoomDetails::new("QUAD", "Quad Room"),
        start_date: date(2026, 3, 10),
        end_date: date(2026, 3, 13),
        hotel_id: "hotel-demo".to_string(),
        listing_id: id.split(':').next().unwrap_or(id).to_string(),
        price_rating: rating,
        color_tag: "#1d4ed8".to_string(),
        adults: 2,
        children: 0,
        commission_rate: 0.10,
    }
}

fn demo_reservation() -> ReservationContext {
    ReservationContext {
        confirmation_number: "HJ-DEMO-1".to_string(),
        hotel_name: "Dar Al Nuzul".to_string(),
        guest_name: "Demo Guest".to_string(),
        guest_phone: "+966500000000".to_string().into(),
        guest_email: "guest@example.com".to_string().into(),
        guest_nationality: "SA".to_string(),
        check_in: date(2026, 3, 10),
        check_out: date(2026, 3, 13),
        total: 1000.0,
        paid: 0.0,
    }
}

/// Headless smoke run: restores the cart from local storage, pushes two
/// rooms through it, then settles a scripted wallet payment end to end.
#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let config = Config::load().expect("Failed to load config");
    tracing::info!(dir = %config.storage.dir.display(), "starting storefront smoke run");

    let session = Session::bootstrap(config).expect("Failed to open local storage");
    let analytics = Arc::new(TracingAnalytics);
    session.report_restore(analytics.as_ref()).await;

    let cart = session.cart();
    cart.set_language(Language::English);
    cart.add_room(demo_room("listing-1:QUAD", PriceRating::Flat { nightly: 100.0 }));
    cart.add_room(demo_room("listing-1:QUAD", PriceRating::Flat { nightly: 100.0 }));
    cart.add_room(demo_room(
        "listing-2:DOUBLE",
        PriceRating::Seasonal {
            default_nightly: 80.0,
            seasons: vec![],
        },
    ));

    let snapshot = cart.snapshot();
    tracing::info!(
        rooms = snapshot.room_count,
        total = snapshot.total_price,
        "cart seeded"
    );

    // Scripted wallet and recording gateway stand in for the device SDK and
    // the live backend, so the run needs no network.
    let wallet = Arc::new(ScriptedWallet::new(vec![
        WalletEvent::MerchantValidationRequested {
            validation_url: "https://wallet.example.com/session".to_string(),
        },
        WalletEvent::Authorized {
            token: "demo-token".to_string(),
        },
    ]));
    let gateway = Arc::new(RecordingGateway::default());
    let notifier = Arc::new(TracingNotifier::new(Language::English));
    let orchestrator = CheckoutOrchestrator::new(
        wallet,
        gateway.clone(),
        notifier,
        analytics,
        session.rates(),
        session::settings_from(&session.config().payments),
    );

    let phase = orchestrator.bootstrap().await;
    if phase != CheckoutPhase::Ready {
        tracing::error!(?phase, "wallet did not become ready");
        return ExitCode::FAILURE;
    }

    let form = CheckoutForm {
        option: Some(PaymentOption::Deposit),
        terms_accepted: true,
    };
    let outcome = match orchestrator.pay(&demo_reservation(), &form).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(error = %e, "payment attempt refused");
            return ExitCode::FAILURE;
        }
    };

    match outcome {
        CheckoutOutcome::Settled { order_id, .. } => {
            tracing::info!(order = %order_id, orders = gateway.create_calls(), "payment settled");
            cart.clear();
            ExitCode::SUCCESS
        }
        other => {
            tracing::error!(?other, "payment did not settle");
            ExitCode::FAILURE
        }
    }
}
