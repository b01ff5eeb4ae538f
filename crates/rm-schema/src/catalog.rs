//! Schema catalog: a checked, inheritance-resolved set of validation schemas.
//!
//! Loading does all the work up front. A catalog that loads is known to have:
//!
//! - unique schema names and unique attribute names per schema;
//! - only known parents, and no inheritance cycles;
//! - only known attribute types, with string constraints on string attributes only;
//! - compiled, fully anchored regexps.
//!
//! Each schema's attribute list is then resolved once: its own attributes first, then those of
//! its ancestors in breadth-first order, with the most derived declaration of a name winning.

use crate::error::CatalogError;
use crate::schema::{AttrType, CatalogFile, SchemaDef};
use regex::Regex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

const RM_1_1_0_JSON: &str = include_str!("../schemas/rm_1_1_0.json");

static RM_1_1_0: LazyLock<SchemaCatalog> = LazyLock::new(|| {
    SchemaCatalog::from_json(RM_1_1_0_JSON).expect("embedded RM 1.1.0 schema catalog is valid")
});

/// An attribute after inheritance resolution.
#[derive(Clone, Debug)]
pub struct ResolvedAttribute {
    pub name: String,
    pub ty: AttrType,
    pub required: bool,
    pub equal_to: Option<String>,
    /// Compiled as `^(?:pattern)$`.
    pub regexp: Option<Regex>,
    /// Pattern as written in the catalog.
    pub pattern: Option<String>,
    /// Schema that declared the winning definition.
    pub declared_in: String,
}

/// A schema after inheritance resolution.
#[derive(Clone, Debug)]
pub struct ResolvedSchema {
    pub name: String,
    pub is_abstract: bool,
    pub parents: Vec<String>,
    /// Every transitive ancestor, nearest first.
    pub ancestors: Vec<String>,
    pub attributes: Vec<ResolvedAttribute>,
}

impl ResolvedSchema {
    pub fn attribute(&self, name: &str) -> Option<&ResolvedAttribute> {
        self.attributes.iter().find(|attr| attr.name == name)
    }
}

/// An immutable, validated set of schemas.
#[derive(Clone, Debug)]
pub struct SchemaCatalog {
    rm_version: Option<String>,
    order: Vec<String>,
    schemas: HashMap<String, ResolvedSchema>,
}

impl SchemaCatalog {
    /// The embedded RM 1.1.0 catalog.
    pub fn rm_1_1_0() -> &'static SchemaCatalog {
        &RM_1_1_0
    }

    /// Source text of the embedded RM 1.1.0 catalog.
    pub fn rm_1_1_0_source() -> &'static str {
        RM_1_1_0_JSON
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    /// Reads and loads a catalog file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read, otherwise any load error.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let json = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn from_file(file: CatalogFile) -> Result<Self, CatalogError> {
        let mut catalog = Self::from_defs(file.schemas)?;
        catalog.rm_version = file.rm_version;
        Ok(catalog)
    }

    /// Checks and resolves a list of schema definitions.
    ///
    /// # Errors
    ///
    /// Returns the first [`CatalogError`] found; no partial catalog is produced.
    pub fn from_defs(defs: Vec<SchemaDef>) -> Result<Self, CatalogError> {
        match Self::build(defs) {
            Ok(catalog) => {
                tracing::info!(schemas = catalog.order.len(), "schema catalog loaded");
                Ok(catalog)
            }
            Err(err) => {
                tracing::warn!(error = %err, "schema catalog rejected");
                Err(err)
            }
        }
    }

    fn build(defs: Vec<SchemaDef>) -> Result<Self, CatalogError> {
        let mut by_name: HashMap<&str, &SchemaDef> = HashMap::new();
        for def in &defs {
            if by_name.insert(def.name.as_str(), def).is_some() {
                return Err(CatalogError::DuplicateSchema(def.name.clone()));
            }
        }

        for def in &defs {
            for parent in &def.inherits {
                if !by_name.contains_key(parent.as_str()) {
                    return Err(CatalogError::UnknownParent {
                        schema: def.name.clone(),
                        parent: parent.clone(),
                    });
                }
            }
        }

        check_acyclic(&defs, &by_name)?;

        let mut declared: HashMap<&str, Vec<ResolvedAttribute>> = HashMap::new();
        for def in &defs {
            declared.insert(def.name.as_str(), compile_attributes(def, &by_name)?);
        }

        let mut schemas = HashMap::new();
        for def in &defs {
            let ancestors = ancestors_of(def, &by_name);
            let mut seen = HashSet::new();
            let mut attributes = Vec::new();
            let owners =
                std::iter::once(def.name.as_str()).chain(ancestors.iter().map(String::as_str));
            for owner in owners {
                for attr in &declared[owner] {
                    if seen.insert(attr.name.clone()) {
                        attributes.push(attr.clone());
                    }
                }
            }
            schemas.insert(
                def.name.clone(),
                ResolvedSchema {
                    name: def.name.clone(),
                    is_abstract: def.is_abstract,
                    parents: def.inherits.clone(),
                    ancestors,
                    attributes,
                },
            );
        }

        Ok(Self {
            rm_version: None,
            order: defs.iter().map(|def| def.name.clone()).collect(),
            schemas,
        })
    }

    pub fn rm_version(&self) -> Option<&str> {
        self.rm_version.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedSchema> {
        self.schemas.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Schema names in catalog order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Schemas in catalog order.
    pub fn schemas(&self) -> impl Iterator<Item = &ResolvedSchema> {
        self.order.iter().filter_map(|name| self.schemas.get(name))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// `true` if `descendant` is `ancestor` or transitively inherits it.
    pub fn inherits(&self, descendant: &str, ancestor: &str) -> bool {
        descendant == ancestor
            || self
                .schemas
                .get(descendant)
                .is_some_and(|schema| schema.ancestors.iter().any(|a| a == ancestor))
    }

    /// Concrete schemas that are `name` or inherit it, in catalog order.
    pub fn concrete_descendants(&self, name: &str) -> Vec<&str> {
        self.schemas()
            .filter(|schema| !schema.is_abstract && self.inherits(&schema.name, name))
            .map(|schema| schema.name.as_str())
            .collect()
    }
}

/// Depth-first search over parent edges; a back edge is a cycle.
fn check_acyclic(
    defs: &[SchemaDef],
    by_name: &HashMap<&str, &SchemaDef>,
) -> Result<(), CatalogError> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Visiting,
        Done,
    }

    fn visit<'a>(
        name: &'a str,
        by_name: &HashMap<&'a str, &'a SchemaDef>,
        marks: &mut HashMap<&'a str, Mark>,
        stack: &mut Vec<&'a str>,
    ) -> Result<(), CatalogError> {
        match marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                let start = stack.iter().position(|n| *n == name).unwrap_or(0);
                let mut cycle: Vec<String> =
                    stack[start..].iter().map(|n| n.to_string()).collect();
                cycle.push(name.to_string());
                return Err(CatalogError::InheritanceCycle { cycle });
            }
            None => {}
        }

        marks.insert(name, Mark::Visiting);
        stack.push(name);
        if let Some(&def) = by_name.get(name) {
            for parent in &def.inherits {
                visit(parent.as_str(), by_name, marks, stack)?;
            }
        }
        stack.pop();
        marks.insert(name, Mark::Done);
        Ok(())
    }

    let mut marks = HashMap::new();
    let mut stack = Vec::new();
    for def in defs {
        visit(def.name.as_str(), by_name, &mut marks, &mut stack)?;
    }
    Ok(())
}

fn ancestors_of(def: &SchemaDef, by_name: &HashMap<&str, &SchemaDef>) -> Vec<String> {
    let mut ancestors: Vec<String> = Vec::new();
    let mut queue: VecDeque<&str> = def.inherits.iter().map(String::as_str).collect();
    while let Some(name) = queue.pop_front() {
        if name == def.name || ancestors.iter().any(|a| a == name) {
            continue;
        }
        ancestors.push(name.to_string());
        if let Some(&parent) = by_name.get(name) {
            queue.extend(parent.inherits.iter().map(String::as_str));
        }
    }
    ancestors
}

fn compile_attributes(
    def: &SchemaDef,
    by_name: &HashMap<&str, &SchemaDef>,
) -> Result<Vec<ResolvedAttribute>, CatalogError> {
    let mut names = HashSet::new();
    let mut attributes = Vec::with_capacity(def.attributes.len());

    for attr in &def.attributes {
        if !names.insert(attr.name.as_str()) {
            return Err(CatalogError::DuplicateAttribute {
                schema: def.name.clone(),
                attribute: attr.name.clone(),
            });
        }

        let ty = AttrType::parse(&attr.type_).map_err(|reason| CatalogError::InvalidType {
            schema: def.name.clone(),
            attribute: attr.name.clone(),
            reason,
        })?;

        if let Some(target) = ty.schema_name() {
            if !by_name.contains_key(target) {
                return Err(CatalogError::UnknownType {
                    schema: def.name.clone(),
                    attribute: attr.name.clone(),
                    target: target.to_string(),
                });
            }
        }

        if (attr.equal_to.is_some() || attr.regexp.is_some()) && !ty.is_string() {
            return Err(CatalogError::ConstraintOnNonString {
                schema: def.name.clone(),
                attribute: attr.name.clone(),
                type_: ty.to_string(),
            });
        }

        let regexp = attr
            .regexp
            .as_deref()
            .map(|pattern| Regex::new(&format!("^(?:{pattern})$")))
            .transpose()
            .map_err(|source| CatalogError::InvalidRegex {
                schema: def.name.clone(),
                attribute: attr.name.clone(),
                source,
            })?;

        attributes.push(ResolvedAttribute {
            name: attr.name.clone(),
            ty,
            required: attr.required,
            equal_to: attr.equal_to.clone(),
            regexp,
            pattern: attr.regexp.clone(),
            declared_in: def.name.clone(),
        });
    }

    Ok(attributes)
}
