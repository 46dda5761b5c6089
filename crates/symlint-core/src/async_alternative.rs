//! Async alternative resolver.
//!
//! Decides whether a synchronous call ignores an awaitable sibling method
//! reachable through the same calling type. One call site is resolved in a
//! single pass:
//!
//! ```text
//! describe ── extension normalization ── already awaitable? ── candidates ── filter ── finding
//! ```
//!
//! Any step that meets an unresolved symbol ends the pass as compliant.

use crate::cancel::{CancellationToken, Cancelled};
use crate::model::{strip_generic_suffix, SymbolId, SymbolKind, SymbolModel, TypeKind};
use crate::types::Location;
use crate::unit::CallSite;

/// Suffix naming the asynchronous form of a method.
pub const ASYNC_SUFFIX: &str = "Async";

/// Decides whether a method's result can be awaited.
pub trait Awaitability: Send + Sync {
    /// Returns true if calling `method` yields an awaitable value.
    fn is_awaitable(&self, model: &dyn SymbolModel, method: SymbolId) -> bool;
}

/// Trusts the host's own awaitability answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelAwaitability;

impl Awaitability for ModelAwaitability {
    fn is_awaitable(&self, model: &dyn SymbolModel, method: SymbolId) -> bool {
        model.is_awaitable(method)
    }
}

/// Structural awaitability: the return type is a known task type or exposes
/// a `GetAwaiter` method.
#[derive(Debug, Clone)]
pub struct TaskLikeAwaitability {
    task_types: Vec<String>,
}

impl Default for TaskLikeAwaitability {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskLikeAwaitability {
    /// Recognizes `Task` and `ValueTask` (generic or not).
    #[must_use]
    pub fn new() -> Self {
        Self {
            task_types: vec![
                "System.Threading.Tasks.Task".to_string(),
                "System.Threading.Tasks.ValueTask".to_string(),
            ],
        }
    }

    /// Adds a task-like type by full name.
    #[must_use]
    pub fn with_task_type(mut self, full_name: &str) -> Self {
        self.task_types
            .push(strip_generic_suffix(full_name).to_string());
        self
    }
}

impl Awaitability for TaskLikeAwaitability {
    fn is_awaitable(&self, model: &dyn SymbolModel, method: SymbolId) -> bool {
        let Some(ret) = model.symbol_type(method) else {
            return false;
        };
        if let Some(full) = model.full_name(ret) {
            let name = strip_generic_suffix(&full);
            if self.task_types.iter().any(|t| t == name) {
                return true;
            }
        }
        !model.lookup_members(ret, "GetAwaiter").is_empty()
    }
}

/// The invoked method and the static type it was reached through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodDescriptor {
    /// Method actually invoked.
    pub used_method: SymbolId,
    /// Type through which it was reached.
    pub calling_type: SymbolId,
    /// Whether the call is static-shaped.
    ///
    /// An extension method invoked through its receiver counts as an
    /// instance call; only the `Ext.Method(receiver)` form is static.
    pub is_static: bool,
}

/// A synchronous call for which awaitable alternatives exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncFinding {
    /// The call that was resolved.
    pub descriptor: MethodDescriptor,
    /// Awaitable alternatives, in lookup order.
    pub alternatives: Vec<SymbolId>,
    /// Call-site location.
    pub location: Location,
}

/// Resolves async alternatives for call sites.
///
/// Holds no per-call state; one resolver may serve many threads.
pub struct AsyncAlternativeResolver<'a> {
    model: &'a dyn SymbolModel,
    awaitability: &'a dyn Awaitability,
}

impl<'a> AsyncAlternativeResolver<'a> {
    /// Creates a resolver over `model`.
    #[must_use]
    pub fn new(model: &'a dyn SymbolModel, awaitability: &'a dyn Awaitability) -> Self {
        Self {
            model,
            awaitability,
        }
    }

    /// Builds the descriptor of a call, applying extension normalization.
    #[must_use]
    pub fn describe(&self, call: &CallSite) -> Option<MethodDescriptor> {
        let model = self.model;
        let used_method = model.resolve(call.node)?;
        if model.kind(used_method)? != SymbolKind::Method {
            return None;
        }

        let mut calling_type = match call.receiver {
            Some(receiver) => match model.resolve(receiver) {
                Some(sym) if model.kind(sym) == Some(SymbolKind::Method) => {
                    model.symbol_type(sym)?
                }
                _ => model.type_of(receiver)?,
            },
            None => call.enclosing_type?,
        };

        let is_extension = model.is_extension_method(used_method);
        let static_form = is_extension && model.containing_type(used_method) == Some(calling_type);
        if static_form {
            let receiver_param = *model.parameters(used_method).first()?;
            calling_type = model.symbol_type(receiver_param)?;
        }
        let is_static = model.is_static(used_method) && (!is_extension || static_form);

        if model
            .type_kind(calling_type)
            .map_or(true, TypeKind::is_unresolved)
        {
            return None;
        }

        Some(MethodDescriptor {
            used_method,
            calling_type,
            is_static,
        })
    }

    /// Returns the awaitable alternatives to `descriptor.used_method`.
    ///
    /// Empty when the used method is already awaitable.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if `cancel` fires between candidates.
    pub fn alternatives(
        &self,
        descriptor: MethodDescriptor,
        cancel: &CancellationToken,
    ) -> Result<Vec<SymbolId>, Cancelled> {
        let model = self.model;
        let used = descriptor.used_method;
        if self.awaitability.is_awaitable(model, used) {
            return Ok(Vec::new());
        }
        let Some(name) = model.name(used) else {
            return Ok(Vec::new());
        };

        let mut candidates = model.lookup_members(descriptor.calling_type, name);
        if !name.ends_with(ASYNC_SUFFIX) {
            let async_name = format!("{name}{ASYNC_SUFFIX}");
            for candidate in model.lookup_members(descriptor.calling_type, &async_name) {
                if !candidates.contains(&candidate) {
                    candidates.push(candidate);
                }
            }
        }

        let mut alternatives = Vec::new();
        for candidate in candidates {
            cancel.check()?;
            if candidate == used {
                continue;
            }
            if !self.awaitability.is_awaitable(model, candidate) {
                continue;
            }
            if model.is_extension_method(candidate)
                || model.is_static(candidate) == descriptor.is_static
            {
                alternatives.push(candidate);
            }
        }
        Ok(alternatives)
    }

    /// Resolves one call site.
    ///
    /// Returns `Ok(None)` when the call is compliant or cannot be resolved.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if `cancel` fires during the search.
    pub fn check(
        &self,
        call: &CallSite,
        cancel: &CancellationToken,
    ) -> Result<Option<AsyncFinding>, Cancelled> {
        cancel.check()?;
        let Some(descriptor) = self.describe(call) else {
            tracing::trace!("Unresolved call at {}", call.location);
            return Ok(None);
        };
        let alternatives = self.alternatives(descriptor, cancel)?;
        if alternatives.is_empty() {
            return Ok(None);
        }
        Ok(Some(AsyncFinding {
            descriptor,
            alternatives,
            location: call.location.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InMemoryModel, InMemoryModelBuilder, NodeId};

    struct Fixture {
        builder: InMemoryModelBuilder,
        task: SymbolId,
        service: SymbolId,
        string: SymbolId,
    }

    fn fixture() -> Fixture {
        let mut builder = InMemoryModel::builder();
        let task = builder.add_type("System.Threading.Tasks", "Task", TypeKind::Class);
        builder.mark_awaitable(task);
        let service = builder.add_type("App", "Service", TypeKind::Class);
        let string = builder.add_type("System", "String", TypeKind::Class);
        Fixture {
            builder,
            task,
            service,
            string,
        }
    }

    /// `receiver.method()` where the receiver is an expression of type `ty`.
    fn call_on(b: &mut InMemoryModelBuilder, method: SymbolId, ty: SymbolId) -> CallSite {
        let node = b.add_node(Some(method), None);
        let receiver = b.add_node(None, Some(ty));
        CallSite {
            node,
            receiver: Some(receiver),
            enclosing_type: None,
            location: Location::new("src/Caller.cs", 10, 5),
        }
    }

    fn resolve(model: &InMemoryModel, call: &CallSite) -> Option<AsyncFinding> {
        AsyncAlternativeResolver::new(model, &ModelAwaitability)
            .check(call, &CancellationToken::new())
            .unwrap()
    }

    #[test]
    fn sync_call_with_async_sibling_is_flagged() {
        let Fixture {
            mut builder,
            task,
            service,
            string,
        } = fixture();
        let fetch = builder.add_method(service, "Fetch", Some(string));
        let fetch_async = builder.add_method(service, "FetchAsync", Some(task));
        let sync_call = call_on(&mut builder, fetch, service);
        let async_call = call_on(&mut builder, fetch_async, service);
        let model = builder.build();

        let finding = resolve(&model, &sync_call).unwrap();
        assert_eq!(finding.alternatives, vec![fetch_async]);
        assert_eq!(finding.descriptor.calling_type, service);
        assert_eq!(finding.location, sync_call.location);

        assert!(resolve(&model, &async_call).is_none());
    }

    #[test]
    fn static_sync_with_only_instance_async_is_compliant() {
        let Fixture {
            mut builder,
            task,
            service,
            string,
        } = fixture();
        let fetch = builder.add_method(service, "Fetch", Some(string));
        builder.set_static(fetch, true);
        builder.add_method(service, "FetchAsync", Some(task));
        let call = call_on(&mut builder, fetch, service);
        let model = builder.build();

        assert!(resolve(&model, &call).is_none());
    }

    #[test]
    fn static_pair_is_flagged() {
        let Fixture {
            mut builder,
            task,
            service,
            string,
        } = fixture();
        let fetch = builder.add_method(service, "Fetch", Some(string));
        builder.set_static(fetch, true);
        let fetch_async = builder.add_method(service, "FetchAsync", Some(task));
        builder.set_static(fetch_async, true);
        let call = call_on(&mut builder, fetch, service);
        let model = builder.build();

        assert_eq!(resolve(&model, &call).unwrap().alternatives, vec![fetch_async]);
    }

    #[test]
    fn extension_alternative_is_found_for_instance_call() {
        let Fixture {
            mut builder,
            task,
            service,
            string,
        } = fixture();
        let fetch = builder.add_method(service, "Fetch", Some(string));
        let extensions = builder.add_type("App", "ServiceExtensions", TypeKind::Class);
        builder.set_static(extensions, true);
        let ext_async = builder.add_extension_method(extensions, "FetchAsync", service, Some(task));
        let call = call_on(&mut builder, fetch, service);
        let model = builder.build();

        let finding = resolve(&model, &call).unwrap();
        assert_eq!(finding.alternatives, vec![ext_async]);
    }

    #[test]
    fn reduced_extension_call_matches_instance_alternative() {
        let Fixture {
            mut builder,
            task,
            service,
            string,
        } = fixture();
        let extensions = builder.add_type("App", "ServiceExtensions", TypeKind::Class);
        builder.set_static(extensions, true);
        let load = builder.add_extension_method(extensions, "Load", service, Some(string));
        let load_async = builder.add_method(service, "LoadAsync", Some(task));
        // `service.Load()`: extension invoked through its receiver.
        let call = call_on(&mut builder, load, service);
        let model = builder.build();

        let resolver = AsyncAlternativeResolver::new(&model, &ModelAwaitability);
        let descriptor = resolver.describe(&call).unwrap();
        assert!(!descriptor.is_static);
        assert_eq!(descriptor.calling_type, service);
        assert_eq!(resolve(&model, &call).unwrap().alternatives, vec![load_async]);
    }

    #[test]
    fn static_form_extension_call_normalizes_calling_type() {
        let Fixture {
            mut builder,
            task,
            service,
            string,
        } = fixture();
        let extensions = builder.add_type("App", "ServiceExtensions", TypeKind::Class);
        let ext_sync = builder.add_extension_method(extensions, "Load", service, Some(string));
        let ext_async = builder.add_extension_method(extensions, "LoadAsync", service, Some(task));
        // `ServiceExtensions.Load(service)`: the receiver names the static class.
        let call = call_on(&mut builder, ext_sync, extensions);
        let model = builder.build();

        let resolver = AsyncAlternativeResolver::new(&model, &ModelAwaitability);
        let descriptor = resolver.describe(&call).unwrap();
        assert_eq!(descriptor.calling_type, service);
        assert!(descriptor.is_static);
        assert_eq!(resolve(&model, &call).unwrap().alternatives, vec![ext_async]);
    }

    #[test]
    fn already_async_name_does_not_search_async_async() {
        let Fixture {
            mut builder,
            task,
            service,
            string,
        } = fixture();
        let sync_named_async = builder.add_method(service, "SaveAsync", Some(string));
        builder.add_method(service, "SaveAsyncAsync", Some(task));
        let call = call_on(&mut builder, sync_named_async, service);
        let model = builder.build();

        assert!(resolve(&model, &call).is_none());
    }

    #[test]
    fn awaitable_overload_with_same_name_is_flagged() {
        let Fixture {
            mut builder,
            task,
            service,
            string,
        } = fixture();
        let sync = builder.add_method(service, "Save", Some(string));
        let overload = builder.add_method(service, "Save", Some(task));
        builder.add_parameter(overload, "token", string);
        let call = call_on(&mut builder, sync, service);
        let model = builder.build();

        assert_eq!(resolve(&model, &call).unwrap().alternatives, vec![overload]);
    }

    #[test]
    fn chained_call_uses_receiver_return_type() {
        let Fixture {
            mut builder,
            task,
            service,
            string,
        } = fixture();
        let factory = builder.add_type("App", "Factory", TypeKind::Class);
        let create = builder.add_method(factory, "Create", Some(service));
        builder.set_static(create, true);
        let fetch = builder.add_method(service, "Fetch", Some(string));
        let fetch_async = builder.add_method(service, "FetchAsync", Some(task));
        // `Factory.Create().Fetch()`
        let node = builder.add_node(Some(fetch), None);
        let receiver = builder.add_node(Some(create), None);
        let call = CallSite {
            node,
            receiver: Some(receiver),
            enclosing_type: None,
            location: Location::new("src/Caller.cs", 3, 1),
        };
        let model = builder.build();

        assert_eq!(resolve(&model, &call).unwrap().alternatives, vec![fetch_async]);
    }

    #[test]
    fn unqualified_call_uses_enclosing_type() {
        let Fixture {
            mut builder,
            task,
            service,
            string,
        } = fixture();
        let fetch = builder.add_method(service, "Fetch", Some(string));
        builder.add_method(service, "FetchAsync", Some(task));
        let node = builder.add_node(Some(fetch), None);
        let model = builder.build();

        let call = CallSite {
            node,
            receiver: None,
            enclosing_type: Some(service),
            location: Location::new("src/Service.cs", 8, 9),
        };
        assert!(resolve(&model, &call).is_some());

        let orphan = CallSite {
            enclosing_type: None,
            ..call
        };
        assert!(resolve(&model, &orphan).is_none());
    }

    #[test]
    fn unresolved_inputs_fail_open() {
        let Fixture {
            mut builder,
            task,
            service,
            string,
        } = fixture();
        let dynamic = builder.add_type("", "dynamic", TypeKind::Dynamic);
        let fetch = builder.add_method(service, "Fetch", Some(string));
        builder.add_method(service, "FetchAsync", Some(task));
        let on_dynamic = call_on(&mut builder, fetch, dynamic);
        let unresolved_method = CallSite {
            node: builder.add_node(None, None),
            ..on_dynamic.clone()
        };
        let model = builder.build();

        assert!(resolve(&model, &on_dynamic).is_none());
        assert!(resolve(&model, &unresolved_method).is_none());

        let dangling = CallSite {
            node: NodeId(500),
            ..on_dynamic
        };
        assert!(resolve(&model, &dangling).is_none());
    }

    #[test]
    fn structural_awaitability_sees_get_awaiter() {
        let Fixture {
            mut builder,
            service,
            string,
            ..
        } = fixture();
        let awaitable = builder.add_type("App", "Deferred", TypeKind::Struct);
        builder.add_method(awaitable, "GetAwaiter", None);
        let value_task = builder.add_type("System.Threading.Tasks", "ValueTask", TypeKind::Struct);
        let int = builder.add_type("System", "Int32", TypeKind::Struct);
        let value_task_int = builder.construct(value_task, &[int]);
        let deferred = builder.add_method(service, "Deferred", Some(awaitable));
        let counted = builder.add_method(service, "Count", Some(value_task_int));
        let plain = builder.add_method(service, "Plain", Some(string));
        let model = builder.build();

        let structural = TaskLikeAwaitability::new();
        assert!(structural.is_awaitable(&model, deferred));
        assert!(structural.is_awaitable(&model, counted));
        assert!(!structural.is_awaitable(&model, plain));
        assert!(!ModelAwaitability.is_awaitable(&model, deferred));
    }

    #[test]
    fn cancellation_is_propagated() {
        let Fixture {
            mut builder,
            task,
            service,
            string,
        } = fixture();
        let fetch = builder.add_method(service, "Fetch", Some(string));
        builder.add_method(service, "FetchAsync", Some(task));
        let call = call_on(&mut builder, fetch, service);
        let model = builder.build();

        let token = CancellationToken::new();
        token.cancel();
        let result = AsyncAlternativeResolver::new(&model, &ModelAwaitability).check(&call, &token);
        assert_eq!(result, Err(Cancelled));
    }
}
