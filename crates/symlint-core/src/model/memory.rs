//! In-memory [`SymbolModel`] backed by flat symbol and node tables.

use std::collections::HashSet;

use super::{
    strip_generic_suffix, Accessibility, NodeId, SymbolId, SymbolKind, SymbolModel, TypeKind,
};

/// Nesting limit for name rendering on malformed (self-referential) inputs.
const MAX_NAME_DEPTH: usize = 32;

/// Everything the in-memory model knows about one symbol.
///
/// Type-only fields are left at their defaults for members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolData {
    /// Symbol kind.
    pub kind: SymbolKind,
    /// Simple name.
    pub name: String,
    /// Declaring type.
    pub containing_type: Option<SymbolId>,
    /// Declared accessibility.
    pub accessibility: Accessibility,
    /// Static member or static class.
    pub is_static: bool,
    /// Extension method flag.
    pub is_extension: bool,
    /// Return type (methods) or declared type (properties, parameters...).
    pub symbol_type: Option<SymbolId>,
    /// Method parameters.
    pub parameters: Vec<SymbolId>,
    /// Attribute type names.
    pub attributes: Vec<String>,
    /// Whether documentation is attached.
    pub documented: bool,
    /// Shape of a type symbol.
    pub type_kind: Option<TypeKind>,
    /// Declaring namespace of a type.
    pub namespace: Option<String>,
    /// Owning assembly of a type.
    pub assembly: Option<String>,
    /// Type arguments of a constructed generic.
    pub type_arguments: Vec<SymbolId>,
    /// Element type of an array.
    pub element_type: Option<SymbolId>,
    /// Open generic definition of a constructed type.
    pub definition: Option<SymbolId>,
    /// Base class.
    pub base_type: Option<SymbolId>,
    /// Declared members of a type.
    pub members: Vec<SymbolId>,
    /// Whether values of this type can be awaited.
    pub awaitable: bool,
}

impl SymbolData {
    /// Creates a public, non-static symbol with no relations.
    #[must_use]
    pub fn new(kind: SymbolKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            containing_type: None,
            accessibility: Accessibility::Public,
            is_static: false,
            is_extension: false,
            symbol_type: None,
            parameters: Vec::new(),
            attributes: Vec::new(),
            documented: false,
            type_kind: None,
            namespace: None,
            assembly: None,
            type_arguments: Vec::new(),
            element_type: None,
            definition: None,
            base_type: None,
            members: Vec::new(),
            awaitable: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct NodeData {
    symbol: Option<SymbolId>,
    ty: Option<SymbolId>,
}

/// A symbol model held entirely in memory.
///
/// Symbol and node ids are indices into the internal tables. Build one with
/// [`InMemoryModel::builder`] or load it from a JSON
/// [`snapshot`](super::snapshot).
#[derive(Debug, Clone, Default)]
pub struct InMemoryModel {
    symbols: Vec<SymbolData>,
    nodes: Vec<NodeData>,
}

impl InMemoryModel {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> InMemoryModelBuilder {
        InMemoryModelBuilder::default()
    }

    /// Returns the raw data of a symbol.
    #[must_use]
    pub fn get(&self, id: SymbolId) -> Option<&SymbolData> {
        self.symbols.get(id.0 as usize)
    }

    /// Returns the number of symbols.
    #[must_use]
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Returns the number of syntax nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn ids(&self) -> impl Iterator<Item = (SymbolId, &SymbolData)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, data)| (to_id(i), data))
    }

    fn render_name(&self, ty: SymbolId, depth: usize) -> Option<String> {
        if depth > MAX_NAME_DEPTH {
            return None;
        }
        let data = self.get(ty)?;
        match data.type_kind? {
            TypeKind::Array => {
                let element = self.render_name(data.element_type?, depth + 1)?;
                return Some(format!("{element}[]"));
            }
            TypeKind::TypeParameter | TypeKind::Dynamic | TypeKind::Error => {
                return Some(data.name.clone());
            }
            _ => {}
        }

        let mut name = match (data.containing_type, data.namespace.as_deref()) {
            (Some(outer), _) => {
                let outer = self.render_name(outer, depth + 1)?;
                format!("{}.{}", strip_generic_suffix(&outer), data.name)
            }
            (None, Some(ns)) if !ns.is_empty() => format!("{ns}.{}", data.name),
            _ => data.name.clone(),
        };

        if !data.type_arguments.is_empty() {
            let args = data
                .type_arguments
                .iter()
                .map(|arg| {
                    self.render_name(*arg, depth + 1)
                        .unwrap_or_else(|| "?".to_string())
                })
                .collect::<Vec<_>>()
                .join(", ");
            name = format!("{name}<{args}>");
        }
        Some(name)
    }

    /// Base type of `ty`, looking through a constructed type's definition.
    fn base_of(&self, ty: SymbolId) -> Option<SymbolId> {
        let data = self.get(ty)?;
        data.base_type
            .or_else(|| data.definition.and_then(|def| self.get(def)?.base_type))
    }

    /// `ty` followed by its base classes, stopping at the first repeat.
    fn inheritance_chain(&self, ty: SymbolId) -> Vec<SymbolId> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(ty);
        while let Some(t) = current {
            if !seen.insert(t) {
                break;
            }
            chain.push(t);
            current = self.base_of(t);
        }
        chain
    }

    /// Whether an extension whose receiver parameter has type `receiver`
    /// reduces onto some type in `chain`.
    fn extension_applies(&self, receiver: SymbolId, chain: &[SymbolId]) -> bool {
        if self.type_kind(receiver) == Some(TypeKind::TypeParameter) {
            return true;
        }
        if chain.contains(&receiver) {
            return true;
        }
        let Some(receiver_name) = super::definition_name(self, receiver) else {
            return false;
        };
        chain
            .iter()
            .filter_map(|t| super::definition_name(self, *t))
            .any(|name| name == receiver_name)
    }
}

impl SymbolModel for InMemoryModel {
    fn kind(&self, symbol: SymbolId) -> Option<SymbolKind> {
        self.get(symbol).map(|d| d.kind)
    }

    fn name(&self, symbol: SymbolId) -> Option<&str> {
        self.get(symbol).map(|d| d.name.as_str())
    }

    fn containing_type(&self, symbol: SymbolId) -> Option<SymbolId> {
        self.get(symbol)?.containing_type
    }

    fn accessibility(&self, symbol: SymbolId) -> Option<Accessibility> {
        self.get(symbol).map(|d| d.accessibility)
    }

    fn is_static(&self, symbol: SymbolId) -> bool {
        self.get(symbol).is_some_and(|d| d.is_static)
    }

    fn is_extension_method(&self, symbol: SymbolId) -> bool {
        self.get(symbol)
            .is_some_and(|d| d.kind == SymbolKind::Method && d.is_extension)
    }

    fn symbol_type(&self, symbol: SymbolId) -> Option<SymbolId> {
        self.get(symbol)?.symbol_type
    }

    fn parameters(&self, method: SymbolId) -> Vec<SymbolId> {
        self.get(method)
            .map(|d| d.parameters.clone())
            .unwrap_or_default()
    }

    fn has_attribute(&self, symbol: SymbolId, attribute: &str) -> bool {
        self.get(symbol)
            .is_some_and(|d| d.attributes.iter().any(|a| attribute_matches(a, attribute)))
    }

    fn has_documentation(&self, symbol: SymbolId) -> bool {
        self.get(symbol).is_some_and(|d| d.documented)
    }

    fn type_kind(&self, ty: SymbolId) -> Option<TypeKind> {
        self.get(ty)?.type_kind
    }

    fn full_name(&self, ty: SymbolId) -> Option<String> {
        self.render_name(ty, 0)
    }

    fn namespace(&self, ty: SymbolId) -> Option<&str> {
        let data = self.get(ty)?;
        match data.namespace.as_deref() {
            Some(ns) => Some(ns),
            None => data.containing_type.and_then(|outer| self.get(outer)?.namespace.as_deref()),
        }
    }

    fn assembly(&self, ty: SymbolId) -> Option<&str> {
        self.get(ty)?.assembly.as_deref()
    }

    fn type_arguments(&self, ty: SymbolId) -> Vec<SymbolId> {
        self.get(ty)
            .map(|d| d.type_arguments.clone())
            .unwrap_or_default()
    }

    fn array_element(&self, ty: SymbolId) -> Option<SymbolId> {
        let data = self.get(ty)?;
        if data.type_kind == Some(TypeKind::Array) {
            data.element_type
        } else {
            None
        }
    }

    fn members(&self, ty: SymbolId) -> Vec<SymbolId> {
        let Some(data) = self.get(ty) else {
            return Vec::new();
        };
        if data.members.is_empty() {
            if let Some(def) = data.definition.and_then(|def| self.get(def)) {
                return def.members.clone();
            }
        }
        data.members.clone()
    }

    fn resolve(&self, node: NodeId) -> Option<SymbolId> {
        self.nodes.get(node.0 as usize)?.symbol
    }

    fn type_of(&self, expression: NodeId) -> Option<SymbolId> {
        self.nodes.get(expression.0 as usize)?.ty
    }

    fn lookup_members(&self, container: SymbolId, name: &str) -> Vec<SymbolId> {
        match self.type_kind(container) {
            None => return Vec::new(),
            Some(kind) if kind.is_unresolved() => return Vec::new(),
            Some(_) => {}
        }

        let chain = self.inheritance_chain(container);
        let mut found: Vec<SymbolId> = chain
            .iter()
            .flat_map(|ty| self.members(*ty))
            .filter(|m| {
                self.get(*m)
                    .is_some_and(|d| d.kind == SymbolKind::Method && d.name == name)
            })
            .collect();

        for (id, data) in self.ids() {
            if data.kind != SymbolKind::Method || !data.is_extension || data.name != name {
                continue;
            }
            let receiver = data
                .parameters
                .first()
                .and_then(|p| self.symbol_type(*p));
            if receiver.is_some_and(|r| self.extension_applies(r, &chain)) && !found.contains(&id)
            {
                found.push(id);
            }
        }

        found
    }

    fn is_awaitable(&self, method: SymbolId) -> bool {
        let Some(ret) = self.symbol_type(method) else {
            return false;
        };
        self.get(ret).is_some_and(|d| {
            d.awaitable
                || d.definition
                    .and_then(|def| self.get(def))
                    .is_some_and(|def| def.awaitable)
        })
    }
}

/// `ApiController` and `ApiControllerAttribute` name the same attribute.
fn attribute_matches(declared: &str, wanted: &str) -> bool {
    let declared = declared.strip_suffix("Attribute").unwrap_or(declared);
    let wanted = wanted.strip_suffix("Attribute").unwrap_or(wanted);
    declared == wanted
}

#[allow(clippy::cast_possible_truncation)]
fn to_id(index: usize) -> SymbolId {
    SymbolId(index as u32)
}

/// Incremental builder for [`InMemoryModel`].
///
/// Setters ignore ids that do not exist.
#[derive(Debug, Clone, Default)]
pub struct InMemoryModelBuilder {
    symbols: Vec<SymbolData>,
    nodes: Vec<NodeData>,
}

impl InMemoryModelBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a raw symbol and returns its id.
    pub fn push(&mut self, data: SymbolData) -> SymbolId {
        self.symbols.push(data);
        to_id(self.symbols.len() - 1)
    }

    /// Appends a syntax node resolving to `symbol` with static type `ty`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn add_node(&mut self, symbol: Option<SymbolId>, ty: Option<SymbolId>) -> NodeId {
        self.nodes.push(NodeData { symbol, ty });
        NodeId((self.nodes.len() - 1) as u32)
    }

    /// Adds a named type declared in `namespace` (empty for the global namespace).
    pub fn add_type(&mut self, namespace: &str, name: &str, kind: TypeKind) -> SymbolId {
        let mut data = SymbolData::new(SymbolKind::Type, name);
        data.type_kind = Some(kind);
        data.namespace = (!namespace.is_empty()).then(|| namespace.to_string());
        self.push(data)
    }

    /// Adds an unsubstituted generic parameter such as `T`.
    pub fn add_type_parameter(&mut self, name: &str) -> SymbolId {
        self.add_type("", name, TypeKind::TypeParameter)
    }

    /// Adds a constructed generic `definition<arguments...>`.
    pub fn construct(&mut self, definition: SymbolId, arguments: &[SymbolId]) -> SymbolId {
        let mut data = match self.symbol(definition) {
            Some(def) => {
                let mut data = SymbolData::new(SymbolKind::Type, def.name.clone());
                data.type_kind = def.type_kind;
                data.namespace = def.namespace.clone();
                data.assembly = def.assembly.clone();
                data.containing_type = def.containing_type;
                data.awaitable = def.awaitable;
                data
            }
            None => {
                let mut data = SymbolData::new(SymbolKind::Type, "?");
                data.type_kind = Some(TypeKind::Error);
                data
            }
        };
        data.definition = Some(definition);
        data.type_arguments = arguments.to_vec();
        self.push(data)
    }

    /// Adds a single-dimensional array of `element`.
    pub fn array_of(&mut self, element: SymbolId) -> SymbolId {
        let name = self
            .symbol(element)
            .map_or_else(|| "?[]".to_string(), |e| format!("{}[]", e.name));
        let mut data = SymbolData::new(SymbolKind::Type, name);
        data.type_kind = Some(TypeKind::Array);
        data.element_type = Some(element);
        self.push(data)
    }

    /// Adds an instance method on `owner`.
    pub fn add_method(
        &mut self,
        owner: SymbolId,
        name: &str,
        returns: Option<SymbolId>,
    ) -> SymbolId {
        let mut data = SymbolData::new(SymbolKind::Method, name);
        data.symbol_type = returns;
        self.add_member(owner, data)
    }

    /// Adds a static extension method on `owner` whose receiver has type `receiver`.
    pub fn add_extension_method(
        &mut self,
        owner: SymbolId,
        name: &str,
        receiver: SymbolId,
        returns: Option<SymbolId>,
    ) -> SymbolId {
        let mut data = SymbolData::new(SymbolKind::Method, name);
        data.symbol_type = returns;
        data.is_static = true;
        data.is_extension = true;
        let method = self.add_member(owner, data);
        self.add_parameter(method, "self", receiver);
        method
    }

    /// Appends a parameter to `method`.
    pub fn add_parameter(&mut self, method: SymbolId, name: &str, ty: SymbolId) -> SymbolId {
        let mut data = SymbolData::new(SymbolKind::Parameter, name);
        data.symbol_type = Some(ty);
        data.containing_type = self.symbol(method).and_then(|m| m.containing_type);
        let param = self.push(data);
        if let Some(m) = self.symbol_mut(method) {
            m.parameters.push(param);
        }
        param
    }

    /// Adds a public instance property on `owner`.
    pub fn add_property(&mut self, owner: SymbolId, name: &str, ty: SymbolId) -> SymbolId {
        let mut data = SymbolData::new(SymbolKind::Property, name);
        data.symbol_type = Some(ty);
        self.add_member(owner, data)
    }

    /// Adds a member of any kind on `owner`.
    pub fn add_member(&mut self, owner: SymbolId, mut data: SymbolData) -> SymbolId {
        data.containing_type = Some(owner);
        let id = self.push(data);
        if let Some(o) = self.symbol_mut(owner) {
            o.members.push(id);
        }
        id
    }

    /// Sets the static flag.
    pub fn set_static(&mut self, id: SymbolId, is_static: bool) -> &mut Self {
        if let Some(d) = self.symbol_mut(id) {
            d.is_static = is_static;
        }
        self
    }

    /// Sets declared accessibility.
    pub fn set_accessibility(&mut self, id: SymbolId, accessibility: Accessibility) -> &mut Self {
        if let Some(d) = self.symbol_mut(id) {
            d.accessibility = accessibility;
        }
        self
    }

    /// Sets the owning assembly of a type.
    pub fn set_assembly(&mut self, ty: SymbolId, assembly: &str) -> &mut Self {
        if let Some(d) = self.symbol_mut(ty) {
            d.assembly = Some(assembly.to_string());
        }
        self
    }

    /// Sets the base class of a type.
    pub fn set_base_type(&mut self, ty: SymbolId, base: SymbolId) -> &mut Self {
        if let Some(d) = self.symbol_mut(ty) {
            d.base_type = Some(base);
        }
        self
    }

    /// Nests `ty` inside `outer`.
    pub fn set_containing_type(&mut self, ty: SymbolId, outer: SymbolId) -> &mut Self {
        if let Some(d) = self.symbol_mut(ty) {
            d.containing_type = Some(outer);
        }
        self
    }

    /// Marks values of a type as awaitable.
    pub fn mark_awaitable(&mut self, ty: SymbolId) -> &mut Self {
        if let Some(d) = self.symbol_mut(ty) {
            d.awaitable = true;
        }
        self
    }

    /// Attaches an attribute type name.
    pub fn add_attribute(&mut self, id: SymbolId, attribute: &str) -> &mut Self {
        if let Some(d) = self.symbol_mut(id) {
            d.attributes.push(attribute.to_string());
        }
        self
    }

    /// Sets whether documentation is attached.
    pub fn set_documented(&mut self, id: SymbolId, documented: bool) -> &mut Self {
        if let Some(d) = self.symbol_mut(id) {
            d.documented = documented;
        }
        self
    }

    /// Finishes the model.
    #[must_use]
    pub fn build(self) -> InMemoryModel {
        InMemoryModel {
            symbols: self.symbols,
            nodes: self.nodes,
        }
    }

    fn symbol(&self, id: SymbolId) -> Option<&SymbolData> {
        self.symbols.get(id.0 as usize)
    }

    fn symbol_mut(&mut self, id: SymbolId) -> Option<&mut SymbolData> {
        self.symbols.get_mut(id.0 as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_renders_generics_and_arrays() {
        let mut b = InMemoryModel::builder();
        let list = b.add_type("System.Collections.Generic", "List", TypeKind::Class);
        let dto = b.add_type("Foo.Client", "Dto", TypeKind::Class);
        let list_dto = b.construct(list, &[dto]);
        let dtos = b.array_of(dto);
        let model = b.build();

        assert_eq!(
            model.full_name(list_dto).as_deref(),
            Some("System.Collections.Generic.List<Foo.Client.Dto>")
        );
        assert_eq!(model.full_name(dtos).as_deref(), Some("Foo.Client.Dto[]"));
        assert_eq!(model.array_element(dtos), Some(dto));
        assert_eq!(model.array_element(dto), None);
    }

    #[test]
    fn nested_type_takes_outer_name_and_namespace() {
        let mut b = InMemoryModel::builder();
        let outer = b.add_type("App", "Outer", TypeKind::Class);
        let inner = b.add_type("", "Inner", TypeKind::Class);
        b.set_containing_type(inner, outer);
        let model = b.build();

        assert_eq!(model.full_name(inner).as_deref(), Some("App.Outer.Inner"));
        assert_eq!(model.namespace(inner), Some("App"));
    }

    #[test]
    fn self_referential_arguments_do_not_overflow() {
        let mut b = InMemoryModel::builder();
        let mut data = SymbolData::new(SymbolKind::Type, "Loop");
        data.type_kind = Some(TypeKind::Class);
        data.type_arguments = vec![SymbolId(0)];
        b.push(data);
        let model = b.build();

        assert!(model.full_name(SymbolId(0)).is_some());
    }

    #[test]
    fn lookup_includes_base_members_and_reduced_extensions() {
        let mut b = InMemoryModel::builder();
        let task = b.add_type("System.Threading.Tasks", "Task", TypeKind::Class);
        b.mark_awaitable(task);
        let base = b.add_type("App", "Base", TypeKind::Class);
        let derived = b.add_type("App", "Derived", TypeKind::Class);
        b.set_base_type(derived, base);
        let inherited = b.add_method(base, "FetchAsync", Some(task));
        let ext_owner = b.add_type("App", "Extensions", TypeKind::Class);
        let ext = b.add_extension_method(ext_owner, "FetchAsync", base, Some(task));
        let unrelated = b.add_type("App", "Other", TypeKind::Class);
        b.add_extension_method(ext_owner, "FetchAsync", unrelated, Some(task));
        let model = b.build();

        let found = model.lookup_members(derived, "FetchAsync");
        assert_eq!(found, vec![inherited, ext]);
        assert!(model.is_awaitable(inherited));
        assert!(model.is_extension_method(ext));
        assert!(!model.is_extension_method(inherited));
    }

    #[test]
    fn lookup_on_unresolved_type_is_empty() {
        let mut b = InMemoryModel::builder();
        let dynamic = b.add_type("", "dynamic", TypeKind::Dynamic);
        let model = b.build();
        assert!(model.lookup_members(dynamic, "Fetch").is_empty());
        assert!(model.lookup_members(SymbolId(99), "Fetch").is_empty());
    }

    #[test]
    fn constructed_type_inherits_members_and_awaitability() {
        let mut b = InMemoryModel::builder();
        let task = b.add_type("System.Threading.Tasks", "Task", TypeKind::Class);
        b.mark_awaitable(task);
        let int = b.add_type("System", "Int32", TypeKind::Struct);
        let task_int = b.construct(task, &[int]);
        let getter = b.add_method(task, "GetAwaiter", None);
        let owner = b.add_type("App", "Service", TypeKind::Class);
        let method = b.add_method(owner, "CountAsync", Some(task_int));
        let model = b.build();

        assert_eq!(model.members(task_int), vec![getter]);
        assert!(model.is_awaitable(method));
    }

    #[test]
    fn attribute_suffix_is_optional() {
        let mut b = InMemoryModel::builder();
        let ty = b.add_type("App", "OrdersController", TypeKind::Class);
        b.add_attribute(ty, "ApiControllerAttribute");
        let model = b.build();
        assert!(model.has_attribute(ty, "ApiController"));
        assert!(model.has_attribute(ty, "ApiControllerAttribute"));
        assert!(!model.has_attribute(ty, "Route"));
    }
}
