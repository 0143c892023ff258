use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dp_review::config::{self, DETAIL_HISTORY_LIMIT, UPCOMING_LIMIT};
use dp_review::srs::StudyGoal;
use dp_review::{store, ItemKind, ReviewItem, Scheduler, SchedulerError, SchedulerHandle};

#[derive(Parser)]
#[command(name = "dp-review", about = "Spaced repetition reviews for the DP tutorial")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Start tracking a chapter, exercise, concept, formula or pattern
  Add {
    id: String,
    #[arg(long, default_value = "chapter", value_parser = parse_kind)]
    kind: ItemKind,
    #[arg(long, default_value = "")]
    content: String,
  },
  /// Rate how well an item was recalled (0 = forgot, 5 = perfect)
  Review { id: String, quality: u8 },
  /// Show the interval each answer button would give
  Preview { id: String },
  /// List items due now
  Due,
  /// List the next items to come due
  Upcoming {
    #[arg(long, default_value_t = UPCOMING_LIMIT)]
    limit: usize,
  },
  /// Collection statistics, analytics and goals
  Stats,
  /// Details and recent history of one item
  Show { id: String },
  /// Print the stored JSON
  Export,
  /// Replace the collection with a JSON dump (current or legacy format)
  Import { file: PathBuf },
}

fn parse_kind(s: &str) -> Result<ItemKind, String> {
  ItemKind::from_str(s).ok_or_else(|| {
    let names: Vec<&str> = ItemKind::ALL.iter().map(|k| k.as_str()).collect();
    format!("expected one of {}", names.join(", "))
  })
}

fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dp_review=info".into()),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  let cli = Cli::parse();
  if let Err(e) = run(cli.command) {
    eprintln!("error: {}", e);
    std::process::exit(1);
  }
}

fn run(command: Command) -> Result<(), SchedulerError> {
  let storage = config::load_storage_config();
  // An unavailable store leaves this run working on an in-memory collection
  let handle =
    SchedulerHandle::open_or_in_memory(Scheduler::new(), store::open_store(&storage), storage.key)?;

  match command {
    Command::Add { id, kind, content } => {
      let item = handle.create_item(id, kind, content)?;
      println!("Added {} '{}', due now", item.kind.as_str(), item.id);
    }
    Command::Review { id, quality } => {
      let outcome = handle.review(&id, quality)?;
      let days = if outcome.interval == 1 { "day" } else { "days" };
      println!(
        "Next review of '{}' in {} {} (ease {:.2}, repetitions {}{})",
        id,
        outcome.interval,
        days,
        outcome.ease_factor,
        outcome.repetitions,
        if outcome.is_graduated { ", graduated" } else { "" }
      );
    }
    Command::Preview { id } => {
      let previews = handle.read(|s| s.preview_buttons(&id))??;
      for preview in previews {
        println!("{:<10} -> {} day(s)", preview.quality.label(), preview.interval);
      }
    }
    Command::Due => {
      let lines = handle.read(|s| {
        let now = s.now();
        s.items_due_for_review(now).into_iter().map(summary).collect::<Vec<_>>()
      })?;
      if lines.is_empty() {
        println!("No reviews due.");
      }
      for line in lines {
        println!("{}", line);
      }
    }
    Command::Upcoming { limit } => {
      let lines = handle.read(|s| {
        let now = s.now();
        s.upcoming(now, limit).into_iter().map(summary).collect::<Vec<_>>()
      })?;
      for line in lines {
        println!("{}", line);
      }
    }
    Command::Stats => {
      let (analytics, goals) = handle.read(|s| {
        let now = s.now();
        (s.analytics(now), s.goals(now))
      })?;
      let stats = &analytics.stats;
      println!("Items:          {} ({} learning, {} graduated)", stats.total, stats.learning, stats.graduated);
      println!("Due now:        {}", stats.due);
      println!("Total reviews:  {}", stats.total_reviews);
      println!("Average ease:   {:.2}", stats.average_ease);
      println!("Accuracy:       {:.0}%", analytics.accuracy_percent);
      println!("This week:      {} item(s) reviewed", analytics.recent_reviews);
      let dist = analytics.ease_distribution;
      println!("Ease bands:     {} difficult, {} normal, {} easy", dist.difficult, dist.normal, dist.easy);
      for goal in goals {
        println!("Goal: {}", describe_goal(&goal));
      }
    }
    Command::Show { id } => {
      let item = handle
        .read(|s| s.get(&id).cloned())?
        .ok_or(SchedulerError::NotFound(id))?;
      print_details(&item);
    }
    Command::Export => {
      println!("{}", handle.export()?);
    }
    Command::Import { file } => {
      let raw = std::fs::read_to_string(&file).map_err(dp_review::StoreError::from)?;
      let count = handle.import(&raw)?;
      println!("Imported {} item(s) from {}", count, file.display());
    }
  }
  Ok(())
}

fn summary(item: &ReviewItem) -> String {
  format!(
    "{:<24} {:<9} due {}  ease {:.1}",
    item.id,
    item.kind.as_str(),
    item.next_due_at.format("%Y-%m-%d %H:%M"),
    item.ease_factor
  )
}

fn describe_goal(goal: &StudyGoal) -> String {
  match goal {
    StudyGoal::Graduate { learning } => format!("{} item(s) still to graduate", learning),
    StudyGoal::ClearBacklog { due } => format!("reduce the backlog ({} due)", due),
    StudyGoal::ImproveMastery { average_ease } => {
      format!("improve mastery (average ease {:.1})", average_ease)
    }
    StudyGoal::AddContent { total } => format!("add more content ({} item(s) so far)", total),
  }
}

fn print_details(item: &ReviewItem) {
  println!("{} ({})", item.id, item.kind.as_str());
  if !item.content.is_empty() {
    println!("  {}", item.content);
  }
  println!("  Ease factor:  {:.2}", item.ease_factor);
  println!("  Interval:     {} day(s)", item.interval_days);
  println!("  Repetitions:  {}", item.repetition_count);
  println!("  Next review:  {}", item.next_due_at.format("%Y-%m-%d"));
  println!("  Status:       {}", if item.is_graduated { "graduated" } else { "learning" });
  let history = item.recent_history(DETAIL_HISTORY_LIMIT);
  if !history.is_empty() {
    println!("  Recent reviews:");
    for record in history {
      println!(
        "    {}  {:<9} {}d",
        record.date.format("%Y-%m-%d"),
        record.quality.label(),
        record.interval
      );
    }
  }
}
