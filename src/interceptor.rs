//! Transparent hook wrapping
//!
//! Wraps capability-typed hook functions so that every invocation is timed
//! and recorded while the call contract stays byte-identical: the original
//! hook runs exactly once with the identical argument value, its return
//! value is forwarded unchanged, and a failure is re-raised as the same
//! error value. Wrapping is explicit decoration: the combinators return
//! new function values and never mutate shared plugin state.

use crate::context::InspectContext;
use crate::options::PluginOrder;
use crate::record::HookRecord;
use crate::recorder::BuildVariant;
use anyhow::Result;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Future returned by a hook invocation.
pub type HookFuture<T> = BoxFuture<'static, Result<T>>;

/// Resolve hook: maybe rewrites a specifier to another identifier.
pub type ResolveIdHook = Arc<dyn Fn(ResolveIdArgs) -> HookFuture<Option<String>> + Send + Sync>;

/// Load hook: maybe produces a module's initial content.
pub type LoadHook = Arc<dyn Fn(LoadArgs) -> HookFuture<Option<String>> + Send + Sync>;

/// Transform hook: maybe rewrites a module's content.
pub type TransformHook = Arc<dyn Fn(TransformArgs) -> HookFuture<Option<String>> + Send + Sync>;

/// Arguments of a resolve invocation. `variant` selects the recorder.
#[derive(Debug, Clone)]
pub struct ResolveIdArgs {
    pub specifier: String,
    pub importer: Option<String>,
    pub variant: BuildVariant,
}

/// Arguments of a load invocation.
#[derive(Debug, Clone)]
pub struct LoadArgs {
    pub id: String,
    pub variant: BuildVariant,
}

/// Arguments of a transform invocation.
#[derive(Debug, Clone)]
pub struct TransformArgs {
    pub code: String,
    pub id: String,
    pub variant: BuildVariant,
}

/// A hook function together with its own declared order, if any.
#[derive(Clone)]
pub struct HookFn<F> {
    pub handler: F,
    pub order: Option<PluginOrder>,
}

impl<F> HookFn<F> {
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            order: None,
        }
    }

    pub fn with_order(mut self, order: PluginOrder) -> Self {
        self.order = Some(order);
        self
    }
}

/// The hooks one plugin exposes to the pipeline. Absent hooks stay absent
/// through instrumentation.
#[derive(Clone, Default)]
pub struct PluginHooks {
    pub name: String,
    pub order: Option<PluginOrder>,
    pub resolve_id: Option<HookFn<ResolveIdHook>>,
    pub load: Option<HookFn<LoadHook>>,
    pub transform: Option<HookFn<TransformHook>>,
}

impl PluginHooks {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Composite execution-order tag, diagnostic output only.
fn order_tag(plugin: Option<PluginOrder>, hook: Option<PluginOrder>) -> String {
    format!(
        "{}-{}",
        plugin.unwrap_or_default(),
        hook.unwrap_or_default()
    )
}

/// Wrap every hook a plugin implements; hooks it does not implement are a
/// silent no-op. Returns the instrumented copy.
pub fn instrument_plugin(ctx: &Arc<InspectContext>, plugin: PluginHooks) -> PluginHooks {
    let PluginHooks {
        name,
        order,
        resolve_id,
        load,
        transform,
    } = plugin;

    let resolve_id = resolve_id.map(|hook| {
        tracing::debug!(plugin = %name, hook = "resolveId", order = %order_tag(order, hook.order), "wrapping hook");
        HookFn {
            handler: wrap_resolve_id(ctx.clone(), name.clone(), hook.handler),
            order: hook.order,
        }
    });
    let load = load.map(|hook| {
        tracing::debug!(plugin = %name, hook = "load", order = %order_tag(order, hook.order), "wrapping hook");
        HookFn {
            handler: wrap_load(ctx.clone(), name.clone(), hook.handler),
            order: hook.order,
        }
    });
    let transform = transform.map(|hook| {
        tracing::debug!(plugin = %name, hook = "transform", order = %order_tag(order, hook.order), "wrapping hook");
        HookFn {
            handler: wrap_transform(ctx.clone(), name.clone(), hook.handler),
            order: hook.order,
        }
    });

    PluginHooks {
        name,
        order,
        resolve_id,
        load,
        transform,
    }
}

/// Decorate a transform hook. A content-producing call appends to the
/// transform chain; a no-op only bumps the invoke counter; a failure is
/// recorded with `error` populated and then re-raised untouched.
pub fn wrap_transform(
    ctx: Arc<InspectContext>,
    plugin_name: impl Into<String>,
    hook: TransformHook,
) -> TransformHook {
    let plugin_name = plugin_name.into();
    Arc::new(move |args: TransformArgs| {
        let ctx = ctx.clone();
        let hook = hook.clone();
        let plugin_name = plugin_name.clone();
        Box::pin(async move {
            let id = args.id.clone();
            let input = args.code.clone();
            let variant = args.variant;

            let start = ctx.now();
            let outcome = (hook)(args).await;
            let end = ctx.now();

            let recorder = ctx.recorder(variant);
            match &outcome {
                Ok(Some(code)) => recorder.record_transform(
                    &id,
                    HookRecord::ok(plugin_name.as_str(), start, end, code.clone()),
                    &input,
                ),
                Ok(None) => recorder.count_transform(&id),
                Err(err) => recorder.record_transform(
                    &id,
                    HookRecord::failed(plugin_name.as_str(), start, end, err.to_string()),
                    &input,
                ),
            }
            outcome
        })
    })
}

/// Decorate a load hook. Produced content restarts the identifier's chain.
pub fn wrap_load(
    ctx: Arc<InspectContext>,
    plugin_name: impl Into<String>,
    hook: LoadHook,
) -> LoadHook {
    let plugin_name = plugin_name.into();
    Arc::new(move |args: LoadArgs| {
        let ctx = ctx.clone();
        let hook = hook.clone();
        let plugin_name = plugin_name.clone();
        Box::pin(async move {
            let id = args.id.clone();
            let variant = args.variant;

            let start = ctx.now();
            let outcome = (hook)(args).await;
            let end = ctx.now();

            let recorder = ctx.recorder(variant);
            match &outcome {
                Ok(Some(code)) => recorder.record_load(
                    &id,
                    HookRecord::ok(plugin_name.as_str(), start, end, code.clone()),
                ),
                Ok(None) => {}
                Err(err) => recorder.record_load(
                    &id,
                    HookRecord::failed(plugin_name.as_str(), start, end, err.to_string()),
                ),
            }
            outcome
        })
    })
}

/// Decorate a resolve hook. Only a genuine redirection (a non-empty
/// outcome different from the input specifier) is recorded; self
/// resolutions and null outcomes carry no routing information.
pub fn wrap_resolve_id(
    ctx: Arc<InspectContext>,
    plugin_name: impl Into<String>,
    hook: ResolveIdHook,
) -> ResolveIdHook {
    let plugin_name = plugin_name.into();
    Arc::new(move |args: ResolveIdArgs| {
        let ctx = ctx.clone();
        let hook = hook.clone();
        let plugin_name = plugin_name.clone();
        Box::pin(async move {
            let specifier = args.specifier.clone();
            let variant = args.variant;

            let start = ctx.now();
            let outcome = (hook)(args).await;
            let end = ctx.now();

            if let Ok(Some(resolved)) = &outcome {
                if !resolved.is_empty() && *resolved != specifier {
                    ctx.recorder(variant).record_resolve(
                        &specifier,
                        HookRecord::ok(plugin_name.as_str(), start, end, resolved.clone()),
                    );
                }
            }
            outcome
        })
    })
}
