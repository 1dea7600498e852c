use crate::error::Result;
use crate::format::{format_error, format_report};
use crate::models::Credentials;
use crate::orchestrator::GradeFetcher;
use crate::transport::ChatTransport;
use dashmap::DashMap;
use tracing::{debug, warn};

const WELCOME: &str = "🤖 *University Grade Bot*\n\n\
I can fetch your grades from the official portal.\n\n\
*How to use:*\n\
1. Send /login and enter your portal credentials\n\
2. I fetch your latest grades over a one-time session\n\
3. Read your report right here\n\n\
*Privacy:* credentials are used once and never stored.";

const HELP: &str = "🆘 *Help*\n\n\
/start - about this bot\n\
/login - fetch your grades\n\
/grades - how to view grades\n\
/help - this message\n\n\
Use your official portal credentials. Nothing is stored.";

const GRADES_HINT: &str = "📊 To view your grades, start with the /login command.";

const ASK_USERNAME: &str = "🔐 *Portal login*\n\nPlease enter your portal username:";

const ASK_PASSWORD: &str = "✅ Username saved.\n\nNow enter your portal password:";

const FETCHING: &str = "⏳ Logging into the portal...";

/// Where a chat currently is in the credential collection flow.
///
/// The username travels inside the step itself; the password is never stored
/// here at all. It exists only inside the in-flight [`Credentials`] value,
/// which is dropped (and zeroized) the moment the fetch returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    AwaitingUsername,
    AwaitingPassword { username: String },
    InProgress,
}

/// Per-chat conversation state machine driving the grade fetch.
///
/// The state table is keyed by chat identity with per-key atomicity:
/// operations on different chats never block each other, and a single
/// chat's transitions take its current step out of the table atomically.
pub struct GradeBot<F, T> {
    fetcher: F,
    transport: T,
    sessions: DashMap<i64, Step>,
}

impl<F: GradeFetcher, T: ChatTransport> GradeBot<F, T> {
    pub fn new(fetcher: F, transport: T) -> Self {
        Self {
            fetcher,
            transport,
            sessions: DashMap::new(),
        }
    }

    /// Current step for a chat, if a login flow is active.
    pub fn step(&self, chat_id: i64) -> Option<Step> {
        self.sessions.get(&chat_id).map(|entry| entry.value().clone())
    }

    /// Entry point for one inbound message. Commands are dispatched here;
    /// everything else advances the credential flow.
    pub async fn handle_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let text = text.trim();
        match text {
            "/start" => self.transport.send_message(chat_id, WELCOME).await.map(drop),
            "/help" => self.transport.send_message(chat_id, HELP).await.map(drop),
            "/grades" => self
                .transport
                .send_message(chat_id, GRADES_HINT)
                .await
                .map(drop),
            "/login" => self.on_login_command(chat_id).await,
            _ if text.starts_with('/') => {
                // Unknown commands belong to the hosting layer, and commands
                // never advance credential collection.
                Ok(())
            }
            _ => self.on_text(chat_id, text).await,
        }
    }

    /// Begins (or restarts) credential collection for a chat. A repeated
    /// /login discards any partially entered credentials.
    pub async fn on_login_command(&self, chat_id: i64) -> Result<()> {
        self.sessions.insert(chat_id, Step::AwaitingUsername);
        self.transport.send_message(chat_id, ASK_USERNAME).await?;
        Ok(())
    }

    /// Advances the state machine with a non-command text message.
    pub async fn on_text(&self, chat_id: i64, text: &str) -> Result<()> {
        // Take the current step out atomically; every branch decides what,
        // if anything, goes back in.
        let Some((_, step)) = self.sessions.remove(&chat_id) else {
            return Ok(());
        };

        match step {
            Step::AwaitingUsername => {
                self.sessions.insert(
                    chat_id,
                    Step::AwaitingPassword {
                        username: text.to_string(),
                    },
                );
                self.transport.send_message(chat_id, ASK_PASSWORD).await?;
                Ok(())
            }
            Step::AwaitingPassword { username } => {
                self.sessions.insert(chat_id, Step::InProgress);
                let credentials = Credentials::new(username, text);
                let outcome = self.run_fetch(chat_id, &credentials).await;
                drop(credentials); // password zeroized here
                // Terminal: the state never outlives the attempt, so a
                // crashed fetch cannot leave the chat stuck mid-flow.
                self.sessions.remove(&chat_id);
                outcome
            }
            Step::InProgress => {
                // Unreachable when the transport serializes a chat's
                // messages; keep the marker rather than dropping it.
                self.sessions.insert(chat_id, Step::InProgress);
                debug!(chat_id, "message ignored, fetch already in progress");
                Ok(())
            }
        }
    }

    async fn run_fetch(&self, chat_id: i64, credentials: &Credentials) -> Result<()> {
        let progress = self.transport.send_message(chat_id, FETCHING).await?;

        let text = match self.fetcher.fetch_grades(credentials).await {
            Ok(report) => format_report(&report),
            Err(err) => {
                warn!(chat_id, error = %err, "grade fetch failed");
                format_error(&err)
            }
        };

        if let Err(err) = self.transport.edit_message(chat_id, progress, &text).await {
            debug!(chat_id, error = %err, "edit failed, sending a fresh message");
            self.transport.send_message(chat_id, &text).await?;
        }
        Ok(())
    }
}
