//! Generate daily and weekly reports

use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;
use worklog_api::ApiClient;

use crate::utils;

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// Generate the daily report
    Daily {
        /// Date to report on (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Shortcut for the day before today
        #[arg(long, conflicts_with = "date")]
        yesterday: bool,
    },
    /// Generate the weekly report (defaults to this week so far)
    Weekly {
        /// First day of the range (YYYY-MM-DD)
        #[arg(long, requires = "end")]
        start: Option<NaiveDate>,

        /// Last day of the range (YYYY-MM-DD)
        #[arg(long, requires = "start")]
        end: Option<NaiveDate>,

        /// Shortcut for the previous full week, Monday through Sunday
        #[arg(long, conflicts_with_all = ["start", "end"])]
        last_week: bool,
    },
}

pub async fn run(client: &ApiClient, command: ReportCommand) -> Result<()> {
    let today = chrono::Local::now().date_naive();

    let report = match command {
        ReportCommand::Daily { date, yesterday } => {
            let date = if yesterday {
                Some(utils::yesterday(today))
            } else {
                date
            };
            client.generate_daily_report(date).await?
        }
        ReportCommand::Weekly {
            start,
            end,
            last_week,
        } => {
            let (start, end) = match (start, end) {
                (Some(start), Some(end)) => (start, end),
                _ if last_week => utils::last_week(today),
                _ => utils::this_week(today),
            };
            client.generate_weekly_report(start, end).await?
        }
    };

    // Reports are Markdown; print them as-is
    println!("{report}");
    Ok(())
}
