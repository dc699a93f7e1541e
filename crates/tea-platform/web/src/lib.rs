//! Browser platform adapter: a DOM [`Document`](tea_core::Document), a
//! microtask executor, a `performance.now()` clock and `setTimeout` sleeps.

mod document;

use std::rc::Rc;
use std::time::Duration;

use futures_task::{LocalFutureObj, LocalSpawn, SpawnError};
use tea_core::{Clock, Program, Runtime, RuntimeError, RuntimeHandle};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

pub use document::{WebDocument, WebListener};

/// Spawns command futures onto the browser's microtask queue.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebExecutor;

impl LocalSpawn for WebExecutor {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        wasm_bindgen_futures::spawn_local(future);
        Ok(())
    }
}

/// [`Clock`] backed by `performance.now()`, relative to page load.
#[derive(Debug, Clone)]
pub struct PerformanceClock {
    performance: Option<web_sys::Performance>,
}

impl PerformanceClock {
    pub fn new() -> Self {
        Self {
            performance: web_sys::window().and_then(|window| window.performance()),
        }
    }
}

impl Default for PerformanceClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for PerformanceClock {
    fn now(&self) -> Duration {
        let millis = self
            .performance
            .as_ref()
            .map_or(0.0, web_sys::Performance::now);
        Duration::from_secs_f64(millis.max(0.0) / 1000.0)
    }
}

/// Resolves after `duration` via `setTimeout`. Resolves immediately when no
/// window is available.
pub async fn sleep(duration: Duration) {
    let millis = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let Some(window) = web_sys::window() else {
            resolve_now(&resolve);
            return;
        };
        let scheduled = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(resolve.unchecked_ref(), millis);
        if let Err(err) = scheduled {
            log::warn!("setTimeout failed: {err:?}");
            resolve_now(&resolve);
        }
    });
    if let Err(err) = JsFuture::from(promise).await {
        log::warn!("sleep interrupted: {err:?}");
    }
}

/// Calls a promise's `resolve` function directly. Returns whether the call
/// succeeded; failures are logged.
fn resolve_now(resolve: &js_sys::Function) -> bool {
    match resolve.call0(&wasm_bindgen::JsValue::NULL) {
        Ok(_) => true,
        Err(err) => {
            log::warn!("resolving sleep failed: {err:?}");
            false
        }
    }
}

/// Schedules `callback` on the next animation frame. The closure is released
/// after it runs once.
pub fn request_animation_frame(callback: impl FnOnce() + 'static) -> Result<(), RuntimeError> {
    let window = web_sys::window().ok_or_else(|| no_window("request_animation_frame"))?;
    let closure = Closure::once_into_js(callback);
    window
        .request_animation_frame(closure.unchecked_ref())
        .map(drop)
        .map_err(|err| {
            RuntimeError::Host(tea_core::HostError::Rejected {
                operation: "request_animation_frame",
                reason: format!("{err:?}"),
            })
        })
}

fn no_window(operation: &'static str) -> RuntimeError {
    RuntimeError::Host(tea_core::HostError::Rejected {
        operation,
        reason: "no window".to_owned(),
    })
}

/// Mounts `program` into the element with id `element_id`, replacing its
/// existing content. Installs [`WebExecutor`] unless the program already has
/// a spawner.
pub fn start<Model, Msg>(
    program: Program<Model, Msg>,
    element_id: &str,
) -> Result<Runtime<Model, Msg, WebDocument>, RuntimeError>
where
    Model: 'static,
    Msg: Clone + PartialEq + 'static,
{
    let document = WebDocument::from_window().ok_or_else(|| no_window("start"))?;
    let mount_point = document
        .raw()
        .get_element_by_id(element_id)
        .ok_or_else(|| {
            RuntimeError::Host(tea_core::HostError::Missing {
                node: format!("#{element_id}"),
            })
        })?;
    mount_point.set_inner_html("");
    let program = if program.has_spawner() {
        program
    } else {
        program.with_spawner(Rc::new(WebExecutor))
    };
    log::info!("mounting into #{element_id}");
    program.run(document, mount_point.into())
}

/// Like [`start`], but leaks the runtime for the lifetime of the page and
/// returns a handle for dispatching from outside the view.
pub fn start_detached<Model, Msg>(
    program: Program<Model, Msg>,
    element_id: &str,
) -> Result<RuntimeHandle<Msg>, RuntimeError>
where
    Model: 'static,
    Msg: Clone + PartialEq + 'static,
{
    let runtime = start(program, element_id)?;
    let handle = runtime.handle();
    std::mem::forget(runtime);
    Ok(handle)
}

#[cfg(all(test, target_arch = "wasm32"))]
#[path = "tests/lib_tests.rs"]
mod tests;
