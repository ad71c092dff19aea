use crate::config::{AppConfig, FailurePolicy, SummarizerProvider};

pub fn run(config: &AppConfig) {
    println!("{}", describe(config));
}

fn describe(config: &AppConfig) -> String {
    let summarizer = match &config.summarizer {
        SummarizerProvider::Command { program, args } if args.is_empty() => {
            format!("command `{program}` (text on stdin)")
        }
        SummarizerProvider::Command { program, args } => {
            format!("command `{program} {}` (text on stdin)", args.join(" "))
        }
        SummarizerProvider::Http { endpoint } => format!("http POST {endpoint}"),
    };
    let policy = match config.failure_policy {
        FailurePolicy::Isolate => "isolate failed groups",
        FailurePolicy::FailFast => "stop at first failure",
    };

    [
        format!("Repository: {}", config.workspace_root.display()),
        format!("Summarizer: {summarizer}"),
        format!("Summary timeout: {}s", config.summary_timeout.as_secs()),
        format!("Summary retries: {}", config.summary_retries),
        format!("Summaries in flight: {}", config.summary_concurrency),
        format!("Commit fetches in flight: {}", config.fetch_concurrency),
        format!("Failure policy: {policy}"),
    ]
    .join("\n")
}
