//! View dispatcher
//!
//! A [`View`] is bound to one entity and one contract. Every call goes
//! through [`View::invoke`], which looks the method name up in the
//! contract's [`MethodTable`] and routes it:
//!
//! 1. root methods are delegated straight to the entity
//! 2. provided bodies run with this view as receiver
//! 3. marked methods run the primitive operation their descriptor names
//!
//! A name that validated but has no route is an internal fault. It is
//! logged and returned, never papered over.

use crate::engine::Shared;
use crate::registry::{ContractRegistry, MethodKey};
use crate::resolver::{MarkerFamily, Membership, MethodDescriptor, Mode};
use crate::schema::{Contract, ContractRef, MethodBody, PassThrough};
use facets_core::{ContractId, EntityId, Error, Payload, Result, Value};
use facets_entity::{Entity, WeakEntity};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{error, trace};

// =============================================================================
// Arguments and replies
// =============================================================================

/// One argument of a dynamic call
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// Null; for a setter this means "remove"
    Null,
    /// A payload value
    Value(Value),
    /// An entity identity
    Id(EntityId),
}

impl Arg {
    /// Argument carrying `value`
    pub fn value(value: impl Into<Value>) -> Self {
        Arg::Value(value.into())
    }

    /// Whether this is `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Arg::Null)
    }

    fn as_id(&self) -> Option<EntityId> {
        match self {
            Arg::Id(id) | Arg::Value(Value::Id(id)) => Some(*id),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Arg::Null => "null",
            Arg::Value(_) => "value",
            Arg::Id(_) => "id",
        }
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Value(value)
    }
}

impl From<EntityId> for Arg {
    fn from(id: EntityId) -> Self {
        Arg::Id(id)
    }
}

impl<T: Payload> From<Option<T>> for Arg {
    fn from(value: Option<T>) -> Self {
        value.map_or(Arg::Null, |v| Arg::Value(v.into_value()))
    }
}

/// Lazy sequence of views produced by a stream method
pub struct ViewStream(Box<dyn Iterator<Item = View> + Send>);

impl ViewStream {
    fn new(iter: impl Iterator<Item = View> + Send + 'static) -> Self {
        Self(Box::new(iter))
    }
}

impl Iterator for ViewStream {
    type Item = View;

    fn next(&mut self) -> Option<View> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl fmt::Debug for ViewStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ViewStream")
    }
}

/// Result of a dynamic call
#[derive(Debug)]
pub enum Reply {
    /// No value
    Unit,
    /// Soft absence
    Absent,
    /// A payload value
    Value(Value),
    /// An entity identity
    Id(EntityId),
    /// A count
    Count(usize),
    /// A set of identities
    Ids(Vec<EntityId>),
    /// One view
    View(View),
    /// A set of views
    Set(Vec<View>),
    /// A lazy sequence of views
    Stream(ViewStream),
}

impl Reply {
    /// Shape name (for diagnostics)
    pub fn kind(&self) -> &'static str {
        match self {
            Reply::Unit => "unit",
            Reply::Absent => "absent",
            Reply::Value(_) => "value",
            Reply::Id(_) => "id",
            Reply::Count(_) => "count",
            Reply::Ids(_) => "ids",
            Reply::View(_) => "view",
            Reply::Set(_) => "set",
            Reply::Stream(_) => "stream",
        }
    }

    fn mismatch(&self, expected: &'static str) -> Error {
        Error::ReplyMismatch {
            expected,
            actual: self.kind(),
        }
    }

    /// Whether this is `Absent`
    pub fn is_absent(&self) -> bool {
        matches!(self, Reply::Absent)
    }

    /// Expect no value
    pub fn into_unit(self) -> Result<()> {
        match self {
            Reply::Unit => Ok(()),
            other => Err(other.mismatch("unit")),
        }
    }

    /// Expect a present payload of type `T`
    pub fn into_value<T: Payload>(self) -> Result<T> {
        match self {
            Reply::Value(value) => {
                let actual = value.value_type().name();
                value.into_payload().ok_or(Error::ReplyMismatch {
                    expected: T::TYPE.name(),
                    actual,
                })
            }
            other => Err(other.mismatch(T::TYPE.name())),
        }
    }

    /// Expect an optional payload of type `T`
    pub fn into_optional<T: Payload>(self) -> Result<Option<T>> {
        match self {
            Reply::Absent => Ok(None),
            other => other.into_value().map(Some),
        }
    }

    /// Expect an identity
    pub fn into_id(self) -> Result<EntityId> {
        match self {
            Reply::Id(id) => Ok(id),
            other => Err(other.mismatch("id")),
        }
    }

    /// Expect an optional identity
    pub fn into_optional_id(self) -> Result<Option<EntityId>> {
        match self {
            Reply::Absent => Ok(None),
            other => other.into_id().map(Some),
        }
    }

    /// Expect a count
    pub fn into_count(self) -> Result<usize> {
        match self {
            Reply::Count(n) => Ok(n),
            other => Err(other.mismatch("count")),
        }
    }

    /// Expect a set of identities
    pub fn into_ids(self) -> Result<Vec<EntityId>> {
        match self {
            Reply::Ids(ids) => Ok(ids),
            other => Err(other.mismatch("ids")),
        }
    }

    /// Expect one view
    pub fn into_view(self) -> Result<View> {
        match self {
            Reply::View(view) => Ok(view),
            other => Err(other.mismatch("view")),
        }
    }

    /// Expect one view of contract `C`
    pub fn into_contract<C: Contract>(self) -> Result<C> {
        self.into_view()?.as_contract()
    }

    /// Expect an optional view of contract `C`
    pub fn into_optional_contract<C: Contract>(self) -> Result<Option<C>> {
        match self {
            Reply::Absent => Ok(None),
            other => other.into_contract().map(Some),
        }
    }

    /// Expect a set of views of contract `C`
    pub fn into_set<C: Contract>(self) -> Result<Vec<C>> {
        match self {
            Reply::Set(views) => views.into_iter().map(|v| v.as_contract()).collect(),
            other => Err(other.mismatch("set")),
        }
    }

    /// Expect a stream of views of contract `C`
    pub fn into_stream<C: Contract>(self) -> Result<impl Iterator<Item = C>> {
        match self {
            Reply::Stream(stream) => Ok(stream.map(C::from_view)),
            other => Err(other.mismatch("stream")),
        }
    }
}

// =============================================================================
// Method table
// =============================================================================

/// Where one method name is routed
#[derive(Debug, Clone)]
pub enum Route {
    /// Delegated to the entity
    PassThrough(PassThrough),
    /// Provided body declared on the given contract
    Provided(ContractId),
    /// Marked method with its published descriptor
    Marked(Arc<MethodDescriptor>),
    /// Declared but without a published descriptor
    Unroutable,
}

/// Routes for every method visible on one contract
///
/// Root methods take precedence. After them, a contract's own declarations
/// shadow those of its super-contracts.
#[derive(Debug, Default)]
pub struct MethodTable {
    routes: FxHashMap<&'static str, Route>,
}

impl MethodTable {
    pub(crate) fn build(registry: &ContractRegistry, contract: ContractRef) -> Self {
        let mut routes = FxHashMap::default();
        for op in PassThrough::ALL {
            routes.insert(op.name(), Route::PassThrough(op));
        }

        let mut visited = FxHashSet::default();
        let mut stack = vec![contract];
        while let Some(next) = stack.pop() {
            if next.is_root() || !visited.insert(next.id()) {
                continue;
            }
            let Some(entry) = registry.contract(next.id()) else {
                continue;
            };
            for method in &entry.schema.methods {
                let route = match method.body {
                    MethodBody::Static(_) => continue,
                    MethodBody::Provided(_) => Route::Provided(next.id()),
                    MethodBody::Abstract => registry
                        .descriptor(&MethodKey::new(next.id(), method.name))
                        .map_or(Route::Unroutable, Route::Marked),
                };
                routes.entry(method.name).or_insert(route);
            }
            stack.extend(entry.schema.extends.iter().rev().copied());
        }
        Self { routes }
    }

    /// Route of `method`
    pub fn route(&self, method: &str) -> Option<&Route> {
        self.routes.get(method)
    }

    /// Number of routed names
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no names are routed
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

// =============================================================================
// View
// =============================================================================

struct ViewCore {
    entity: WeakEntity,
    contract: ContractRef,
    table: Arc<MethodTable>,
    shared: Arc<Shared>,
}

/// An entity seen through one contract
///
/// Cloning is cheap and yields the same instance; use [`View::ptr_eq`] to
/// compare instances.
#[derive(Clone)]
pub struct View(Arc<ViewCore>);

impl View {
    pub(crate) fn new(
        entity: &Entity,
        contract: ContractRef,
        table: Arc<MethodTable>,
        shared: Arc<Shared>,
    ) -> Self {
        View(Arc::new(ViewCore {
            entity: entity.downgrade(),
            contract,
            table,
            shared,
        }))
    }

    /// Contract this view implements
    pub fn contract(&self) -> ContractRef {
        self.0.contract
    }

    /// The backing entity
    ///
    /// # Errors
    ///
    /// `StaleView` once the entity has been dropped.
    pub fn entity(&self) -> Result<Entity> {
        self.0.entity.upgrade().ok_or(Error::StaleView {
            contract: self.0.contract.name(),
        })
    }

    /// Whether the backing entity is gone
    pub fn is_stale(&self) -> bool {
        !self.0.entity.is_alive()
    }

    /// Whether this view is bound to exactly `entity`
    pub fn is_bound_to(&self, entity: &Entity) -> bool {
        self.0.entity.points_to(entity)
    }

    /// Whether both handles are the same view instance
    pub fn ptr_eq(&self, other: &View) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Identity of the backing entity
    pub fn id(&self) -> Result<EntityId> {
        self.invoke(PassThrough::Id.name(), &[])?.into_id()
    }

    /// Wrap in the typed adapter of `C`
    ///
    /// # Errors
    ///
    /// `ReplyMismatch` if this view is bound to a different contract.
    pub fn as_contract<C: Contract>(&self) -> Result<C> {
        if self.0.contract == C::contract() {
            Ok(C::from_view(self.clone()))
        } else {
            Err(Error::ReplyMismatch {
                expected: C::NAME,
                actual: self.0.contract.name(),
            })
        }
    }

    /// Invoke `method` by name
    ///
    /// # Errors
    ///
    /// - `StaleView` if the entity is gone
    /// - `UnknownMethod` if no contract in the hierarchy declares `method`
    /// - `ArgumentMismatch` if `args` do not fit the declaration
    /// - whatever the routed operation reports
    pub fn invoke(&self, method: &str, args: &[Arg]) -> Result<Reply> {
        let entity = self.entity()?;
        let contract = self.0.contract;
        let route = self.0.table.route(method).ok_or_else(|| Error::UnknownMethod {
            contract: contract.name(),
            method: method.to_string(),
        })?;

        trace!(
            target: "facets::dispatch",
            contract = contract.name(),
            method,
            entity = %entity.id(),
            "Dispatching"
        );

        match route {
            Route::PassThrough(op) => op.apply(&entity, args),
            Route::Provided(owner) => self
                .0
                .shared
                .bodies
                .invoker(*owner)
                .and_then(|invoker| invoker.invoke(method, self, args))
                .unwrap_or_else(|| Err(self.fault(method))),
            Route::Marked(desc) => self.route_marked(&entity, method, desc, args),
            Route::Unroutable => Err(self.fault(method)),
        }
    }

    fn fault(&self, method: &str) -> Error {
        let contract = self.0.contract.name();
        error!(
            target: "facets::dispatch",
            contract,
            method,
            "No route for validated method"
        );
        Error::InternalDispatchFault {
            contract,
            method: method.to_string(),
        }
    }

    fn route_marked(
        &self,
        entity: &Entity,
        method: &str,
        desc: &MethodDescriptor,
        args: &[Arg],
    ) -> Result<Reply> {
        if args.len() != desc.arity {
            return Err(Error::argument_mismatch(
                method,
                format!("expected {} arguments, got {}", desc.arity, args.len()),
            ));
        }

        match desc.family {
            MarkerFamily::AttributeGet => {
                let key = desc.attribute().ok_or_else(|| self.fault(method))?;
                match desc.mode {
                    Mode::Soft => Ok(entity.get_attribute(key).map_or(Reply::Absent, Reply::Value)),
                    Mode::Strict => entity.get_attribute_strict(key).map(Reply::Value),
                }
            }
            MarkerFamily::AttributeSet => {
                let key = desc.attribute().ok_or_else(|| self.fault(method))?;
                let previous = match &args[0] {
                    Arg::Null => match desc.mode {
                        Mode::Soft => entity.remove_attribute(key),
                        Mode::Strict => Some(entity.remove_attribute_strict(key)?),
                    },
                    Arg::Value(value) => entity.add_attribute(key.clone(), value.clone())?,
                    Arg::Id(id) => entity.add_attribute(key.clone(), Value::Id(*id))?,
                };
                if desc.returns_unit {
                    Ok(Reply::Unit)
                } else {
                    Ok(previous.map_or(Reply::Absent, Reply::Value))
                }
            }
            MarkerFamily::EntityCreate => {
                let target = desc.contract().ok_or_else(|| self.fault(method))?;
                let marks = self.0.shared.registry.lineage(target);
                let child = match args.first() {
                    None => entity.new_child(&marks),
                    Some(arg) => {
                        let id = arg.as_id().ok_or_else(|| {
                            Error::argument_mismatch(method, format!("expected id, got {}", arg.kind()))
                        })?;
                        entity.new_child_with_id(id, &marks)?
                    }
                };
                self.0.shared.cached_view(&child, target).map(Reply::View)
            }
            MarkerFamily::EntityGet => {
                let target = desc.contract().ok_or_else(|| self.fault(method))?;
                let id = args[0].as_id().ok_or_else(|| {
                    Error::argument_mismatch(method, format!("expected id, got {}", args[0].kind()))
                })?;
                let child = match desc.mode {
                    Mode::Soft => match entity.get_child(id) {
                        Some(child) => child,
                        None => return Ok(Reply::Absent),
                    },
                    Mode::Strict => entity.get_child_strict(id)?,
                };
                self.0.shared.cached_view(&child, target).map(Reply::View)
            }
            MarkerFamily::EntitySet => {
                let target = desc.contract().ok_or_else(|| self.fault(method))?;
                let table = self.0.shared.table(target)?;
                let views = select_children(entity, target, desc.membership)
                    .iter()
                    .map(|child| self.0.shared.view_with(child, target, &table))
                    .collect();
                Ok(Reply::Set(views))
            }
            MarkerFamily::EntityStream => {
                let target = desc.contract().ok_or_else(|| self.fault(method))?;
                let table = self.0.shared.table(target)?;
                let children = select_children(entity, target, desc.membership);
                let shared = Arc::clone(&self.0.shared);
                Ok(Reply::Stream(ViewStream::new(
                    children
                        .into_iter()
                        .map(move |child| shared.view_with(&child, target, &table)),
                )))
            }
        }
    }
}

fn select_children(entity: &Entity, target: ContractRef, membership: Membership) -> Vec<Entity> {
    match membership {
        Membership::ExactType => entity.children_marked(target.id()),
        Membership::Projectable => entity.children(),
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("contract", &self.0.contract.name())
            .field("entity", &self.0.entity)
            .finish()
    }
}
