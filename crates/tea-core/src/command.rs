//! Effects requested by `update`. Their results re-enter the runtime as
//! ordinary messages.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

pub type LocalBoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Commands cannot be cancelled once issued. An application that wants to
/// ignore a late result checks its own state when the message arrives.
pub enum Command<Msg> {
    None,
    /// Deliver a message right after the current cycle.
    Msg(Msg),
    /// Run a future on the host executor; `Some` output is dispatched.
    Perform(LocalBoxFuture<'static, Option<Msg>>),
    Batch(Vec<Command<Msg>>),
}

impl<Msg: 'static> Command<Msg> {
    #[inline]
    pub fn none() -> Self {
        Command::None
    }

    #[inline]
    pub fn message(msg: Msg) -> Self {
        Command::Msg(msg)
    }

    pub fn future(future: impl Future<Output = Option<Msg>> + 'static) -> Self {
        Command::Perform(Box::pin(future))
    }

    /// Runs `future` and maps its output into a message.
    pub fn perform<T>(
        future: impl Future<Output = T> + 'static,
        map: impl FnOnce(T) -> Msg + 'static,
    ) -> Self {
        Command::Perform(Box::pin(async move { Some(map(future.await)) }))
    }

    pub fn batch(commands: impl IntoIterator<Item = Command<Msg>>) -> Self {
        let mut commands: Vec<_> = commands.into_iter().filter(|cmd| !cmd.is_none()).collect();
        match commands.len() {
            0 => Command::None,
            1 => commands.remove(0),
            _ => Command::Batch(commands),
        }
    }

    pub fn is_none(&self) -> bool {
        match self {
            Command::None => true,
            Command::Batch(commands) => commands.iter().all(Command::is_none),
            _ => false,
        }
    }

    /// Lifts a child component's command into the parent's message type.
    pub fn map<U: 'static>(self, f: impl Fn(Msg) -> U + 'static) -> Command<U> {
        let f: Rc<dyn Fn(Msg) -> U> = Rc::new(f);
        self.map_shared(&f)
    }

    fn map_shared<U: 'static>(self, f: &Rc<dyn Fn(Msg) -> U>) -> Command<U> {
        match self {
            Command::None => Command::None,
            Command::Msg(msg) => Command::Msg(f(msg)),
            Command::Perform(future) => {
                let f = Rc::clone(f);
                Command::Perform(Box::pin(async move { future.await.map(|msg| f(msg)) }))
            }
            Command::Batch(commands) => Command::Batch(
                commands
                    .into_iter()
                    .map(|command| command.map_shared(f))
                    .collect(),
            ),
        }
    }

    /// Flattens nested batches, preserving order.
    pub(crate) fn into_leaves(self, out: &mut Vec<Command<Msg>>) {
        match self {
            Command::None => {}
            Command::Batch(commands) => {
                for command in commands {
                    command.into_leaves(out);
                }
            }
            leaf => out.push(leaf),
        }
    }

    /// Stable name for logging.
    pub fn type_name(&self) -> &'static str {
        match self {
            Command::None => "None",
            Command::Msg(_) => "Msg",
            Command::Perform(_) => "Perform",
            Command::Batch(_) => "Batch",
        }
    }
}

impl<Msg> Default for Command<Msg> {
    fn default() -> Self {
        Command::None
    }
}

impl<Msg: fmt::Debug> fmt::Debug for Command<Msg> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::None => write!(f, "None"),
            Command::Msg(msg) => f.debug_tuple("Msg").field(msg).finish(),
            Command::Perform(_) => write!(f, "Perform(..)"),
            Command::Batch(commands) => f.debug_tuple("Batch").field(commands).finish(),
        }
    }
}
