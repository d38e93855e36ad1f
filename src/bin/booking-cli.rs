use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movie_booking_backend::booking::BookingRecord;
use movie_booking_backend::client::{
    BookingController, ClientConfig, FileStore, HttpBookingApi, SubmitOutcome,
};

/// Build a movie ticket booking step by step and submit it.
///
/// Each invocation resumes the draft saved by the previous one.
#[derive(Parser)]
#[command(name = "booking-cli", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pick the movie
    Movie { label: String },
    /// Pick the time slot
    Slot { label: String },
    /// Set the number of tickets for a seat
    Seat {
        label: String,
        #[arg(value_parser = clap::value_parser!(u32).range(0..=10))]
        quantity: u32,
    },
    /// Submit the current draft
    Submit,
    /// Show the draft and the last booking
    Show,
    /// List the selectable movies, slots and seats
    Catalog,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "movie_booking_backend=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env();

    let store = match FileStore::open(&config.state_file) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("Cannot open {}: {err}", config.state_file.display());
            return ExitCode::FAILURE;
        }
    };
    let api = match HttpBookingApi::new(&config.api_url, config.request_timeout) {
        Ok(api) => api,
        Err(err) => {
            eprintln!("Cannot create HTTP client: {err}");
            return ExitCode::FAILURE;
        }
    };
    let controller = BookingController::restore(api, store, config.catalog);
    let catalog = controller.catalog();

    match cli.command {
        Command::Movie { label } => {
            if !catalog.movies.contains(&label) {
                eprintln!("Unknown movie {label:?}; choose one of {:?}", catalog.movies);
                return ExitCode::FAILURE;
            }
            controller.select_movie(&label).await;
        }
        Command::Slot { label } => {
            if !catalog.slots.contains(&label) {
                eprintln!("Unknown slot {label:?}; choose one of {:?}", catalog.slots);
                return ExitCode::FAILURE;
            }
            controller.select_slot(&label).await;
        }
        Command::Seat { label, quantity } => {
            if !catalog.has_seat(&label) {
                eprintln!("Unknown seat {label:?}; choose one of {:?}", catalog.seat_labels);
                return ExitCode::FAILURE;
            }
            controller.set_seat_quantity(&label, quantity).await;
        }
        Command::Submit => {
            let outcome = controller.submit().await;
            if let Some(notice) = controller.take_notice().await {
                println!("{notice}");
            }
            match outcome {
                SubmitOutcome::Booked(record) => print_booking(&record),
                SubmitOutcome::Rejected(_) => return ExitCode::from(2),
                SubmitOutcome::Failed => return ExitCode::FAILURE,
            }
        }
        Command::Show => {
            let draft = controller.draft().await;
            println!("Draft:");
            println!("  Movie: {}", or_dash(&draft.movie));
            println!("  Time-Slot: {}", or_dash(&draft.slot));
            for (label, qty) in &draft.seats {
                println!("  {label}: {qty}");
            }

            println!("Last Booking Details:");
            match controller.load_last_booking().await {
                Some(record) => print_booking(&record),
                None => println!("  No Previous Booking Found!"),
            }
        }
        Command::Catalog => {
            println!("Movies: {}", catalog.movies.join(", "));
            println!("Slots: {}", catalog.slots.join(", "));
            println!("Seats: {}", catalog.seat_labels.join(", "));
        }
    }

    ExitCode::SUCCESS
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

fn print_booking(record: &BookingRecord) {
    let seats: Vec<String> = record
        .seats
        .iter()
        .filter(|(_, qty)| **qty >= 1)
        .map(|(label, qty)| format!("{label}: {qty}"))
        .collect();

    println!("  Movie Name: {}", record.movie);
    println!("  Time-Slot: {}", record.slot);
    println!("  Seats: {}", seats.join(" | "));
}
