use std::rc::Rc;
use std::thread;
use std::time::Duration;

use tea_app_shell::AppShell;
use tea_core::{Clock, MemoryDocument, Program};
use tea_html::events::is_enter;
use tea_html::prelude::*;
use tea_runtime_std::{StdClock, StdRuntime, Timers};

const SAVE_DELAY: Duration = Duration::from_millis(300);

#[derive(Clone, Debug, PartialEq)]
enum Msg {
    Draft(String),
    Add,
    Toggle(u32),
    Remove(u32),
    Saved(usize),
}

#[derive(Debug)]
struct Todo {
    id: u32,
    title: String,
    done: bool,
}

#[derive(Debug, Default)]
struct Model {
    draft: String,
    todos: Vec<Todo>,
    next_id: u32,
    saved: Option<usize>,
}

fn add_on_enter(event: &Event) -> Option<Msg> {
    is_enter(event).then_some(Msg::Add)
}

fn view(model: &Model) -> VNode<Msg> {
    let items = model.todos.iter().map(|todo| {
        let id = todo.id;
        li()
            .key(id.to_string())
            .class_list(&[("done", todo.done)])
            .child(
                input()
                    .input_type("checkbox")
                    .checked(todo.done)
                    .on_keyed("change", &("toggle", id), move |_| Some(Msg::Toggle(id))),
            )
            .child(span().child(text(todo.title.as_str())))
            .child(button().on_click(Msg::Remove(id)).child(text("x")))
    });
    let status = match model.saved {
        Some(count) => format!("saved {count} items"),
        None => "not saved".to_owned(),
    };
    section()
        .id("todoapp")
        .child(
            input()
                .placeholder("What needs to be done?")
                .value(model.draft.as_str())
                .on_input(Msg::Draft)
                .on_key_down(add_on_enter),
        )
        .child(ul().children(items))
        .child(footer().child(text(status)))
        .into()
}

fn update(timers: &Rc<Timers<StdClock>>, msg: Msg, model: &mut Model) -> Command<Msg> {
    match msg {
        Msg::Draft(draft) => model.draft = draft,
        Msg::Add => {
            let title = model.draft.trim().to_owned();
            if title.is_empty() {
                return Command::none();
            }
            model.todos.push(Todo {
                id: model.next_id,
                title,
                done: false,
            });
            model.next_id += 1;
            model.draft.clear();
            return save_later(timers, model.todos.len());
        }
        Msg::Toggle(id) => {
            if let Some(todo) = model.todos.iter_mut().find(|todo| todo.id == id) {
                todo.done = !todo.done;
            }
        }
        Msg::Remove(id) => {
            model.todos.retain(|todo| todo.id != id);
            return save_later(timers, model.todos.len());
        }
        Msg::Saved(count) => model.saved = Some(count),
    }
    Command::none()
}

fn save_later(timers: &Rc<Timers<StdClock>>, count: usize) -> Command<Msg> {
    Command::perform(timers.sleep(SAVE_DELAY), move |()| Msg::Saved(count))
}

fn main() {
    env_logger::init();

    println!("=== TEA Todo Example (headless) ===");
    println!("Adds, toggles and removes items, then waits for the delayed save.");
    println!();

    let std_runtime = StdRuntime::new();
    let timers = std_runtime.timers();
    let program = Program::new(
        view,
        move |msg, model: &mut Model| update(&timers, msg, model),
        Model::default(),
    );

    let mut document = MemoryDocument::new();
    let container = document.create_container("div");
    let mut app = match AppShell::with_std_runtime(program, document, container, std_runtime) {
        Ok(app) => app,
        Err(err) => {
            log::error!("failed to mount: {err}");
            return;
        }
    };

    for title in ["write the differ", "write the patcher", "ship it"] {
        app.dispatch(Msg::Draft(title.to_owned()));
        app.dispatch(Msg::Add);
    }
    app.dispatch(Msg::Toggle(0));
    app.dispatch(Msg::Remove(1));
    app.log_debug_info();

    while app.has_pending_work() {
        if app.should_update() {
            app.update();
            continue;
        }
        let clock = app.std_runtime().clock();
        let wait = app
            .std_runtime()
            .timers()
            .next_deadline()
            .map_or(Duration::from_millis(1), |deadline| {
                deadline.saturating_sub(clock.now())
            });
        thread::sleep(wait);
    }

    app.log_debug_info();
}
