use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

mod config;
mod content;
mod db;
mod error;
mod evaluations;
mod forum;
mod guard;
mod lifecycle;
#[cfg(test)]
mod memory;
mod models;
mod profile;
mod report;
mod scoring;
mod session;
mod store;
mod views;

use config::Config;
use guard::{redirect_missing, Gate, Lookup, Redirect};
use models::{EducationLevel, NewContent, NewEvaluation, Profile, Role, Subject, TutoringRequest};
use profile::{Completion, ProfileForm};
use session::{FileSession, SessionProvider};
use store::Store;

#[derive(Parser)]
#[command(name = "tutoring-hub")]
#[command(
    about = "Study content, quizzes, tutoring requests and a forum for students and volunteer tutors",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load demo profiles, content and a quiz
    Seed,
    /// Store the identity issued by the auth provider
    SignIn {
        #[arg(long)]
        user_id: Uuid,
        #[arg(long)]
        email: String,
    },
    /// Forget the stored identity
    SignOut,
    /// Show the stored identity
    Whoami,
    /// Create the profile for a verified account
    CompleteProfile {
        #[arg(long)]
        full_name: String,
        #[arg(long, value_enum)]
        role: Option<Role>,
        #[arg(long)]
        age: Option<i32>,
        #[arg(long, value_enum)]
        education_level: Option<EducationLevel>,
    },
    /// Student pages
    Student {
        #[command(subcommand)]
        command: StudentCommand,
    },
    /// Tutor pages
    Tutor {
        #[command(subcommand)]
        command: TutorCommand,
    },
}

#[derive(Subcommand)]
enum StudentCommand {
    /// Recent content, results and open requests
    Dashboard,
    /// Content available per subject at your level
    Subjects,
    /// List content for one subject at your level
    Content {
        #[arg(value_enum)]
        subject: Subject,
    },
    /// Read one content item of a subject
    Read {
        #[arg(value_enum)]
        subject: Subject,
        id: Uuid,
    },
    /// Evaluations for your level
    Evaluations,
    /// Show an evaluation, or review your submitted answers
    Evaluation { id: Uuid },
    /// Submit answers, e.g. `--answers 0,2,1` (use -1 for unanswered)
    Take {
        id: Uuid,
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        answers: Vec<i32>,
    },
    /// Your tutoring requests by status
    Tutoring,
    /// Ask for a tutoring session
    Request {
        #[arg(long, value_enum)]
        subject: Subject,
        #[arg(long)]
        description: String,
    },
    /// Cancel one of your tutoring requests
    Cancel { id: Uuid },
    /// Your profile and activity counts
    Profile,
    /// Write your dashboard as markdown
    Report {
        #[arg(long, default_value = "dashboard.md")]
        out: PathBuf,
    },
    /// Community forum
    Forum {
        #[command(subcommand)]
        command: ForumCommand,
    },
}

#[derive(Subcommand)]
enum TutorCommand {
    /// Open requests, upcoming sessions and counts
    Dashboard,
    /// Pending, accepted and completed requests
    Requests,
    /// Show one request
    Request { id: Uuid },
    /// Accept a pending request and schedule it
    Accept {
        id: Uuid,
        /// Session start, YYYY-MM-DDTHH:MM
        #[arg(long)]
        date: Option<String>,
    },
    /// Mark an accepted session as done
    Complete { id: Uuid },
    /// Reject a pending request or cancel an accepted one
    Cancel { id: Uuid },
    /// Content you published
    Content,
    /// Publish a content item
    NewContent {
        #[arg(long, value_enum)]
        subject: Subject,
        #[arg(long, value_enum)]
        education_level: EducationLevel,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        body: String,
    },
    /// Publish content rows from a CSV file
    ImportContent {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Evaluations you published
    Evaluations,
    /// Publish an evaluation from a JSON questions file
    NewEvaluation {
        #[arg(long, value_enum)]
        subject: Subject,
        #[arg(long, value_enum)]
        education_level: EducationLevel,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        questions: PathBuf,
    },
    /// Your profile and activity counts
    Profile,
    /// Write your dashboard as markdown
    Report {
        #[arg(long, default_value = "dashboard.md")]
        out: PathBuf,
    },
    /// Community forum
    Forum {
        #[command(subcommand)]
        command: ForumCommand,
    },
}

#[derive(Subcommand)]
enum ForumCommand {
    /// The 20 newest posts
    List,
    /// Start a thread
    Post {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long, value_enum)]
        subject: Option<Subject>,
    },
    /// Show a post and its comments
    Thread { id: Uuid },
    /// Reply to a post
    Comment {
        id: Uuid,
        #[arg(long)]
        content: String,
    },
}

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_redirect(redirect: Redirect) {
    debug!(path = %redirect.path(), "redirected");
    eprintln!("{redirect}");
}

/// Prints a page, or where the caller is sent instead.
fn show<T>(lookup: Lookup<T>, page: impl FnOnce(T) -> String) {
    match lookup {
        Lookup::Found(value) => print!("{}", page(value)),
        Lookup::Redirect(redirect) => print_redirect(redirect),
    }
}

fn status_line(request: TutoringRequest) -> String {
    format!("Tutoring request {} is {}.\n", request.id, request.status)
}

/// Runs the profile completion gate for a role's pages.
async fn enter(
    sessions: &dyn SessionProvider,
    store: &dyn Store,
    role: Role,
) -> anyhow::Result<Option<Profile>> {
    match guard::require_role(sessions, store, role).await? {
        Gate::Granted(profile) => Ok(Some(profile)),
        Gate::Redirect(redirect) => {
            print_redirect(redirect);
            Ok(None)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(config.log_json);

    let sessions = FileSession::new(config.session_file.clone());

    match cli.command {
        Commands::SignIn { user_id, email } => {
            let session = sessions.sign_in(user_id, &email).await?;
            println!("Signed in as {} ({}).", session.user.email, session.user.id);
        }
        Commands::SignOut => {
            sessions.sign_out().await?;
            println!("Signed out.");
        }
        Commands::Whoami => match sessions.current_user().await? {
            Some(user) => println!(
                "{} ({}) via {}",
                user.email,
                user.id,
                sessions.path().display()
            ),
            None => print_redirect(Redirect::Login),
        },
        command => run_with_store(&config, &sessions, command).await?,
    }

    Ok(())
}

async fn run_with_store(
    config: &Config,
    sessions: &FileSession,
    command: Commands,
) -> anyhow::Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(config.database_url()?)
        .await
        .context("failed to connect to Postgres")?;

    match command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::CompleteProfile {
            full_name,
            role,
            age,
            education_level,
        } => {
            let store = db::PgStore::new(pool);
            let form = ProfileForm {
                full_name,
                age,
                role,
                education_level,
            };
            match profile::complete_profile(sessions, &store, &form).await? {
                Completion::Created(profile) => {
                    println!("Profile ready: {} ({}).", profile.full_name, profile.role)
                }
                Completion::Redirect(redirect) => print_redirect(redirect),
            }
        }
        Commands::Student { command } => {
            let store = db::PgStore::new(pool);
            if let Some(profile) = enter(sessions, &store, Role::Student).await? {
                run_student(&store, &profile, command).await?;
            }
        }
        Commands::Tutor { command } => {
            let store = db::PgStore::new(pool);
            if let Some(profile) = enter(sessions, &store, Role::Tutor).await? {
                run_tutor(&store, &profile, command).await?;
            }
        }
        Commands::SignIn { .. } | Commands::SignOut | Commands::Whoami => {}
    }

    Ok(())
}

async fn run_student(
    store: &dyn Store,
    profile: &Profile,
    command: StudentCommand,
) -> anyhow::Result<()> {
    match command {
        StudentCommand::Dashboard => {
            let dashboard = views::student_dashboard(store, profile).await?;
            print!("{}", report::student_dashboard(&dashboard));
        }
        StudentCommand::Subjects => {
            for (subject, count) in views::subject_overview(store, profile).await? {
                println!(
                    "- {} ({}): {} ({} items)",
                    subject.display_name(),
                    subject,
                    subject.summary(),
                    count
                );
            }
        }
        StudentCommand::Content { subject } => {
            let level = EducationLevel::or_default(profile.education_level);
            let items = content::list_for_level(store, subject, level).await?;
            print!("{}", report::content_list(&items));
        }
        StudentCommand::Read { subject, id } => {
            show(content::get(store, subject, id).await?, |item| {
                report::content_page(&item)
            });
        }
        StudentCommand::Evaluations => {
            let listings = views::student_evaluations(store, profile).await?;
            print!("{}", report::evaluation_list(&listings));
        }
        StudentCommand::Evaluation { id } => {
            show(views::evaluation_review(store, profile, id).await?, |review| {
                report::evaluation_review(&review)
            });
        }
        StudentCommand::Take { id, answers } => {
            let submitted = scoring::submit(store, profile, id, answers).await;
            match redirect_missing(submitted, Redirect::StudentEvaluations)? {
                Lookup::Found(result) => {
                    println!("Evaluation submitted. Score: {}%.", result.score);
                    show(views::evaluation_review(store, profile, id).await?, |review| {
                        report::evaluation_review(&review)
                    });
                }
                Lookup::Redirect(redirect) => print_redirect(redirect),
            }
        }
        StudentCommand::Tutoring => {
            let board = views::student_requests(store, profile.id).await?;
            print!("{}", report::request_board(&board));
        }
        StudentCommand::Request {
            subject,
            description,
        } => {
            let request = lifecycle::create(store, profile, subject, &description).await?;
            println!("Tutoring request {} is pending.", request.id);
        }
        StudentCommand::Cancel { id } => {
            let cancelled = lifecycle::cancel(store, id).await;
            show(redirect_missing(cancelled, Redirect::StudentTutoring)?, status_line);
        }
        StudentCommand::Profile => {
            let stats = views::profile_stats(store, profile).await?;
            print!(
                "{}",
                report::profile_stats(&profile.full_name, &profile.email, &stats)
            );
        }
        StudentCommand::Report { out } => {
            let dashboard = views::student_dashboard(store, profile).await?;
            std::fs::write(&out, report::student_dashboard(&dashboard))?;
            println!("Report written to {}.", out.display());
        }
        StudentCommand::Forum { command } => run_forum(store, profile, command).await?,
    }

    Ok(())
}

async fn run_tutor(
    store: &dyn Store,
    profile: &Profile,
    command: TutorCommand,
) -> anyhow::Result<()> {
    match command {
        TutorCommand::Dashboard => {
            let dashboard = views::tutor_dashboard(store, profile).await?;
            print!("{}", report::tutor_dashboard(&dashboard));
        }
        TutorCommand::Requests => {
            let board = views::tutor_requests(store, profile.id).await?;
            print!("{}", report::request_board(&board));
        }
        TutorCommand::Request { id } => {
            show(views::request_detail(store, id).await?, |listing| {
                report::request_detail(&listing)
            });
        }
        TutorCommand::Accept { id, date } => {
            let scheduled = date.as_deref().map(lifecycle::parse_schedule).transpose()?;
            let accepted = lifecycle::accept(store, id, profile, scheduled).await;
            show(redirect_missing(accepted, Redirect::TutorRequests)?, |request| {
                let date = request
                    .scheduled_date
                    .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                format!("Tutoring request {} accepted for {date}.\n", request.id)
            });
        }
        TutorCommand::Complete { id } => {
            let completed = lifecycle::complete(store, id).await;
            show(redirect_missing(completed, Redirect::TutorRequests)?, status_line);
        }
        TutorCommand::Cancel { id } => {
            let cancelled = lifecycle::cancel(store, id).await;
            show(redirect_missing(cancelled, Redirect::TutorRequests)?, status_line);
        }
        TutorCommand::Content => {
            let items = content::list_authored(store, profile.id).await?;
            print!("{}", report::content_list(&items));
        }
        TutorCommand::NewContent {
            subject,
            education_level,
            title,
            description,
            body,
        } => {
            let draft = NewContent {
                subject,
                education_level,
                title,
                description,
                content: body,
            };
            let item = content::create_content(store, profile, &draft).await?;
            println!("Published {} ({}).", item.title, item.id);
        }
        TutorCommand::ImportContent { csv } => {
            let inserted = content::import_csv(store, profile, &csv).await?;
            println!("Published {inserted} items from {}.", csv.display());
        }
        TutorCommand::Evaluations => {
            for evaluation in evaluations::list_authored(store, profile.id).await? {
                println!(
                    "- {} [{} / {}] {} questions ({})",
                    evaluation.title,
                    evaluation.subject.display_name(),
                    evaluation.education_level.display_name(),
                    evaluation.questions.len(),
                    evaluation.id
                );
            }
        }
        TutorCommand::NewEvaluation {
            subject,
            education_level,
            title,
            description,
            questions,
        } => {
            let draft = NewEvaluation {
                subject,
                education_level,
                title,
                description,
                questions: evaluations::load_questions(&questions)?,
            };
            let evaluation = evaluations::create_evaluation(store, profile, &draft).await?;
            println!(
                "Published {} with {} questions ({}).",
                evaluation.title,
                evaluation.questions.len(),
                evaluation.id
            );
        }
        TutorCommand::Profile => {
            let stats = views::profile_stats(store, profile).await?;
            print!(
                "{}",
                report::profile_stats(&profile.full_name, &profile.email, &stats)
            );
        }
        TutorCommand::Report { out } => {
            let dashboard = views::tutor_dashboard(store, profile).await?;
            std::fs::write(&out, report::tutor_dashboard(&dashboard))?;
            println!("Report written to {}.", out.display());
        }
        TutorCommand::Forum { command } => run_forum(store, profile, command).await?,
    }

    Ok(())
}

async fn run_forum(
    store: &dyn Store,
    profile: &Profile,
    command: ForumCommand,
) -> anyhow::Result<()> {
    match command {
        ForumCommand::List => {
            let posts = forum::recent_posts(store).await?;
            print!("{}", report::forum_posts(&posts));
        }
        ForumCommand::Post {
            title,
            content,
            subject,
        } => {
            let post = forum::create_post(store, profile, subject, &title, &content).await?;
            println!("Posted {} ({}).", post.title, post.id);
        }
        ForumCommand::Thread { id } => {
            let thread = forum::thread(store, id).await;
            show(redirect_missing(thread, Redirect::Forum(profile.role))?, |thread| {
                report::forum_thread(&thread)
            });
        }
        ForumCommand::Comment { id, content } => {
            let comment = forum::add_comment(store, profile, id, &content).await;
            show(redirect_missing(comment, Redirect::Forum(profile.role))?, |comment| {
                format!("Comment {} added.\n", comment.id)
            });
        }
    }

    Ok(())
}
