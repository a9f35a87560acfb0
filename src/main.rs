use uuid::Uuid;

use daylock::config::DaylockConfig;
use daylock::core::task::Flow;
use daylock::core::views;
use daylock::push::{PushEndpoint, PushRegistry};
use daylock::storage;
use daylock::store::{Intent, Store};

enum LaunchMode {
    Today,
    Backlog,
    Completed,
    TomorrowList,
    Capture(String),
    Done(Uuid),
    Stage(Uuid),
    Lock,
    Subscribe(String),
    Unsubscribe(String),
    Notify(String),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = DaylockConfig::load();

    // Set up logging to the systemd user journal (`journalctl --user -t daylock -f`).
    // Wrapper filters: daylock crate at info/debug (per config), everything else at warn.
    {
        struct FilteredJournal {
            inner: systemd_journal_logger::JournalLog,
        }

        impl log::Log for FilteredJournal {
            fn enabled(&self, metadata: &log::Metadata) -> bool {
                if metadata.target().starts_with("daylock") {
                    let max = if daylock::debug_logging() {
                        log::LevelFilter::Debug
                    } else {
                        log::LevelFilter::Info
                    };
                    metadata.level() <= max
                } else {
                    metadata.level() <= log::LevelFilter::Warn
                }
            }
            fn log(&self, record: &log::Record) {
                if self.enabled(record.metadata()) {
                    self.inner.log(record);
                }
            }
            fn flush(&self) {
                self.inner.flush();
            }
        }

        if let Ok(journal) = systemd_journal_logger::JournalLog::new() {
            let journal = journal.with_syslog_identifier("daylock".to_string());
            daylock::set_debug_logging(config.debug_logging);
            if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
                // Global max must be Debug so debug logs can pass through when toggled
                log::set_max_level(log::LevelFilter::Debug);
            }
        }
    }

    let mode = parse_args(std::env::args().skip(1).collect())?;

    config.ensure_files()?;
    let state = storage::load(&config.state_path())?;
    let mut store = Store::new(state);
    store.subscribe(Box::new(storage::Autosave::new(config.state_path())));

    match mode {
        LaunchMode::Today => {
            print_tasks("Today", &views::today(store.state().tasks.as_slice()));
        }
        LaunchMode::Backlog => {
            print_tasks("Backlog", &views::backlog(store.state().tasks.as_slice()));
        }
        LaunchMode::Completed => {
            print_tasks("Completed", &views::completed(store.state().tasks.as_slice()));
        }
        LaunchMode::TomorrowList => {
            print_tasks("Tomorrow", &views::tomorrow(store.state().tasks.as_slice()));
        }
        LaunchMode::Capture(text) => {
            match store.apply(Intent::AddTask {
                text,
                flow: Flow::Backlog,
            }) {
                Some(id) => println!("Captured {} into the backlog", id),
                None => println!("Nothing to capture"),
            }
        }
        LaunchMode::Done(id) => {
            store.apply(Intent::ToggleComplete { id });
        }
        LaunchMode::Stage(id) => {
            store.apply(Intent::MoveTo {
                id,
                flow: Flow::TomorrowStaged,
            });
        }
        LaunchMode::Lock => {
            store.apply(Intent::LockTomorrow);
            print_tasks("Today", &views::today(store.state().tasks.as_slice()));
        }
        LaunchMode::Subscribe(url) => {
            let mut registry = PushRegistry::load(&config.endpoints_path())?;
            registry.subscribe(PushEndpoint::new(url));
            registry.save(&config.endpoints_path())?;
        }
        LaunchMode::Unsubscribe(url) => {
            let mut registry = PushRegistry::load(&config.endpoints_path())?;
            registry.unsubscribe(&url);
            registry.save(&config.endpoints_path())?;
        }
        LaunchMode::Notify(message) => {
            let mut registry = PushRegistry::load(&config.endpoints_path())?;
            let runtime = tokio::runtime::Runtime::new()?;
            let outcome = runtime.block_on(registry.broadcast(&message))?;
            registry.save(&config.endpoints_path())?;
            println!("Delivered {}, failed {}", outcome.delivered, outcome.failed);
        }
    }

    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<LaunchMode, String> {
    let mut iter = args.into_iter();
    let mode = match iter.next().as_deref() {
        None | Some("--today") => LaunchMode::Today,
        Some("--backlog") => LaunchMode::Backlog,
        Some("--completed") => LaunchMode::Completed,
        Some("--tomorrow") => LaunchMode::TomorrowList,
        Some("--capture") => LaunchMode::Capture(take_value(&mut iter, "--capture")?),
        Some("--done") => LaunchMode::Done(take_id(&mut iter, "--done")?),
        Some("--stage") => LaunchMode::Stage(take_id(&mut iter, "--stage")?),
        Some("--lock") => LaunchMode::Lock,
        Some("--subscribe") => LaunchMode::Subscribe(take_value(&mut iter, "--subscribe")?),
        Some("--unsubscribe") => LaunchMode::Unsubscribe(take_value(&mut iter, "--unsubscribe")?),
        Some("--notify") => LaunchMode::Notify(take_value(&mut iter, "--notify")?),
        Some(other) => return Err(format!("Unknown flag: {}", other)),
    };
    Ok(mode)
}

fn take_value(iter: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    iter.next().ok_or_else(|| format!("{} needs a value", flag))
}

fn take_id(iter: &mut impl Iterator<Item = String>, flag: &str) -> Result<Uuid, String> {
    let raw = take_value(iter, flag)?;
    Uuid::parse_str(&raw).map_err(|e| format!("{}: bad task id {}: {}", flag, raw, e))
}

fn print_tasks(title: &str, tasks: &[daylock::core::task::Task]) {
    println!("{} ({})", title, tasks.len());
    for task in tasks {
        let mark = if task.completed { "x" } else { " " };
        match task.category {
            Some(cat) => println!("[{}] {}  {} ({})", mark, task.id, task.text, cat.as_label()),
            None => println!("[{}] {}  {}", mark, task.id, task.text),
        }
    }
}
