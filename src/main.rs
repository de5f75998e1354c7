use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use tasksync::app::AppState;
use tasksync::config::Config;
use tasksync::constants::{
    ENV_USER_EMAIL, ENV_USER_ID, ENV_USER_NAME, ERROR_NOT_SIGNED_IN, ERROR_TASK_CREATE_FAILED,
    ERROR_TASK_DELETE_FAILED, ERROR_TASK_UPDATE_FAILED, SUCCESS_TASK_CREATED, SUCCESS_TASK_DELETED,
    SUCCESS_TASK_UPDATED,
};
use tasksync::identity::{User, UserId};
use tasksync::lists::TaskListId;
use tasksync::logger::Logger;
use tasksync::model::{Priority, Repeat, Task, TaskDraft};
use tasksync::sync::SyncStatus;
use tasksync::utils::datetime;
use tasksync::weather::WeatherService;

#[derive(Parser)]
#[command(name = "tasksync", version, about = "Tasks synced with a remote store and a local mirror")]
struct Cli {
    /// Use this configuration file instead of the default lookup
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print the log records of this run to stderr before exiting
    #[arg(long, global = true)]
    show_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show a list (all, today, important, planned, assigned, or a list id)
    List {
        #[arg(long)]
        view: Option<String>,
        /// Print the tasks as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a task
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        important: bool,
        /// Due date as YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        reminder: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        repeat: Option<Repeat>,
        /// List to file the task under (defaults to the active list)
        #[arg(long)]
        list: Option<String>,
        #[arg(long)]
        outdoor: bool,
        #[arg(long)]
        location: Option<String>,
    },
    /// Edit fields of a task
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        list: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    /// Toggle a task's completed flag
    Done { id: String },
    /// Toggle a task's important flag
    Star { id: String },
    /// Delete a task
    Rm { id: String },
    /// Show the weather for a city, or for an outdoor task with --task
    Weather {
        city: Option<String>,
        #[arg(long)]
        task: Option<String>,
    },
    /// Write a default configuration file
    InitConfig { path: Option<PathBuf> },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Command::InitConfig { path } = &cli.command {
        let path = match path {
            Some(path) => path.clone(),
            None => Config::get_default_config_path()?,
        };
        return Config::generate_default_config(path);
    }

    let config = match &cli.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load()?,
    };

    let logger = Logger::from_config(config.logging.enabled)?;
    let level = if cli.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    logger.install(level)?;

    let result = run(cli.command, &config).await;

    if cli.show_logs {
        for line in logger.get_logs().iter().rev() {
            eprintln!("{line}");
        }
    }

    result
}

async fn run(command: Command, config: &Config) -> Result<()> {
    let Some(user) = user_from_env() else {
        eprintln!("{ERROR_NOT_SIGNED_IN}: {ENV_USER_ID} environment variable not set");
        eprintln!("\n💡 To use this app:");
        eprintln!("1. Export the id of the signed-in user: export {ENV_USER_ID}=your_user_id");
        eprintln!("2. Optionally set {ENV_USER_NAME} and {ENV_USER_EMAIL} for the profile");
        eprintln!("3. Run the command again");
        return Ok(());
    };

    let app = AppState::from_config(config).await?;
    let uid = user.uid.clone();
    app.session.sign_in(user);
    app.tasks.set_active_list(TaskListId::from_id(&config.display.default_list)).await;
    app.tasks.load(&uid).await;

    if let SyncStatus::Failed { message } = app.tasks.status().await {
        eprintln!("⚠️  {message} (showing the last synced copy)");
    }

    match command {
        Command::List { view, json } => {
            let list = view.map(|v| TaskListId::from_id(&v)).unwrap_or(app.tasks.active_list().await);
            let view = app.tasks.view(list).await;
            if json {
                let tasks: Vec<&Task> = view.active.iter().chain(view.completed.iter()).collect();
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else {
                println!("{} ({}% done)", view.list.display_name(), view.progress());
                for task in &view.active {
                    println!("{}", render_task(task, config));
                }
                if config.display.show_completed && !view.completed.is_empty() {
                    println!("\nCompleted");
                    for task in &view.completed {
                        println!("{}", render_task(task, config));
                    }
                }
            }
        }
        Command::Add {
            title,
            description,
            important,
            due,
            time,
            reminder,
            priority,
            repeat,
            list,
            outdoor,
            location,
        } => {
            let list = list.unwrap_or(app.tasks.active_list().await.list_for_new_task());
            let draft = TaskDraft {
                title,
                description,
                important,
                list_id: Some(list),
                due_date: due.map(|d| validate_date(&d)).transpose()?,
                due_time: time,
                reminder,
                repeat,
                priority,
                is_outdoor: Some(outdoor),
                location,
                ..TaskDraft::default()
            };
            let task = app
                .tasks
                .create_task(draft)
                .await
                .context(ERROR_TASK_CREATE_FAILED)?;
            println!("{SUCCESS_TASK_CREATED}: {}", render_task(&task, config));
        }
        Command::Edit {
            id,
            title,
            description,
            due,
            priority,
            list,
            location,
        } => {
            let mut task = app
                .tasks
                .task(&id)
                .await
                .with_context(|| format!("{ERROR_TASK_UPDATE_FAILED}: no task with id {id}"))?;
            if let Some(title) = title {
                task.title = title;
            }
            if let Some(description) = description {
                task.description = Some(description).filter(|d| !d.is_empty());
            }
            if let Some(due) = due {
                task.due_date = if due.is_empty() { None } else { Some(validate_date(&due)?) };
            }
            if let Some(priority) = priority {
                task.priority = priority;
            }
            if let Some(list) = list {
                task.list_id = Some(list);
            }
            if let Some(location) = location {
                task.is_outdoor = !location.is_empty();
                task.location = location;
            }
            report_update(app.tasks.update_task(task).await, config)?;
        }
        Command::Done { id } => report_update(app.tasks.toggle_completed(&id).await, config)?,
        Command::Star { id } => report_update(app.tasks.toggle_important(&id).await, config)?,
        Command::Rm { id } => {
            app.tasks.delete_task(&id).await.context(ERROR_TASK_DELETE_FAILED)?;
            println!("{SUCCESS_TASK_DELETED}: {id}");
        }
        Command::Weather { city, task } => {
            let weather = WeatherService::from_config(&config.weather);
            let result = match (city, task) {
                (_, Some(task_id)) => {
                    let task = app
                        .tasks
                        .task(&task_id)
                        .await
                        .with_context(|| format!("no task with id {task_id}"))?;
                    match weather.weather_for_task(&task).await {
                        Some(result) => result,
                        None => {
                            println!("Task {task_id} is not an outdoor task with a location");
                            return Ok(());
                        }
                    }
                }
                (Some(city), None) => weather.get_weather(&city).await,
                (None, None) => anyhow::bail!("pass a city or --task ID"),
            };
            let data = result.context("Failed to look up the weather")?;
            let verdict = if data.is_outdoor_friendly { "good for outdoor tasks" } else { "better stay in" };
            println!(
                "{}°C (feels like {}°C), {}, humidity {}%, wind {} m/s: {}",
                data.temperature, data.feels_like, data.description, data.humidity, data.wind_speed, verdict
            );
        }
        // Handled before configuration is loaded
        Command::InitConfig { .. } => {}
    }

    Ok(())
}

fn user_from_env() -> Option<User> {
    let uid = UserId::new(std::env::var(ENV_USER_ID).ok()?)?;
    let mut user = User::new(uid);
    user.display_name = std::env::var(ENV_USER_NAME).ok().filter(|v| !v.is_empty());
    user.email = std::env::var(ENV_USER_EMAIL).ok().filter(|v| !v.is_empty());
    Some(user)
}

fn validate_date(date: &str) -> Result<String> {
    datetime::parse_date(date).with_context(|| format!("invalid date '{date}', expected YYYY-MM-DD"))?;
    Ok(date.to_string())
}

fn report_update(result: Result<Task, tasksync::sync::SyncError>, config: &Config) -> Result<()> {
    let task = result.context(ERROR_TASK_UPDATE_FAILED)?;
    println!("{SUCCESS_TASK_UPDATED}: {}", render_task(&task, config));
    Ok(())
}

fn render_task(task: &Task, config: &Config) -> String {
    let check = if task.completed { "[x]" } else { "[ ]" };
    let star = if task.important { "★" } else { " " };
    let mut line = format!("{check} {star} {} ({}, {})", task.title, task.priority, task.id);
    if let Some(due) = &task.due_date {
        let due = if config.display.human_dates { datetime::format_human_date(due) } else { due.clone() };
        line.push_str(&format!(" due {due}"));
        if let Some(time) = &task.due_time {
            line.push_str(&format!(" {time}"));
        }
    }
    if task.wants_weather() {
        line.push_str(&format!(" @ {}", task.location));
    }
    line
}
