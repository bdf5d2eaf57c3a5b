//! The loaded, validated taxonomy.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use regex::{Regex, RegexBuilder};
use rust_decimal::Decimal;

use crate::record::normalize_code;

use super::error::{NotFoundError, SchemaError};
use super::formula::Formula;
use super::rule::{IndexedRule, MatchRule, Share, TextMatcher};
use super::schema::{NodeDefinition, SchemaDefinition, SchemaFormat};
use super::types::{BalanceRoles, ExpectedSign, NodeId, TaxonomyNode};

/// A validated taxonomy.
///
/// Nodes live in an arena in taxonomy order (depth-first pre-order, roots and
/// siblings in declaration order) and refer to their parent by id. Once
/// built, a `Taxonomy` is never mutated; reloading builds a new one.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    name: String,
    nodes: Vec<TaxonomyNode>,
    positions: HashMap<NodeId, usize>,
    children: Vec<Vec<usize>>,
    roles: BalanceRoles,
    unclassified: Option<NodeId>,
    rules: Vec<IndexedRule>,
    exact: HashMap<String, usize>,
    pattern_order: Vec<usize>,
}

impl Taxonomy {
    /// Builds a taxonomy from a definition, checking every structural
    /// invariant.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] found; nothing is returned on failure.
    pub fn load(definition: SchemaDefinition) -> Result<Self, SchemaError> {
        if definition.nodes.is_empty() {
            return Err(SchemaError::Empty);
        }

        let declared = index_declarations(&definition.nodes)?;
        check_parents(&definition.nodes, &declared)?;
        check_acyclic(&definition.nodes, &declared)?;

        let order = preorder(&definition.nodes, &declared);
        let mut nodes: Vec<TaxonomyNode> = Vec::with_capacity(order.len());
        let mut positions: HashMap<NodeId, usize> = HashMap::with_capacity(order.len());

        for &decl in &order {
            let def = &definition.nodes[decl];
            let parent_pos = def
                .parent
                .as_deref()
                .and_then(|parent| positions.get(parent).copied());
            let (depth, inherited) = match parent_pos {
                Some(pos) => {
                    let parent: &TaxonomyNode = &nodes[pos];
                    (parent.depth + 1, parent.effective_sign)
                }
                None => (0, ExpectedSign::Debit),
            };
            let effective_sign = match def.sign {
                ExpectedSign::Either => inherited,
                explicit => explicit,
            };
            let formula = def
                .formula
                .as_deref()
                .map(|source| {
                    Formula::parse(source).map_err(|reason| SchemaError::InvalidFormula {
                        node: def.id.clone(),
                        formula: source.to_string(),
                        reason,
                    })
                })
                .transpose()?;

            positions.insert(NodeId::new(&def.id), nodes.len());
            nodes.push(TaxonomyNode {
                id: NodeId::new(&def.id),
                label: def.label.clone().unwrap_or_else(|| def.id.clone()),
                parent: def.parent.as_deref().map(NodeId::new),
                sign: def.sign,
                effective_sign,
                formula,
                critical: def.critical,
                depth,
            });
        }

        let mut children = vec![Vec::new(); nodes.len()];
        for (pos, node) in nodes.iter().enumerate() {
            if let Some(parent) = &node.parent {
                children[positions[parent]].push(pos);
            }
        }

        for node in &nodes {
            if let Some(formula) = &node.formula {
                for term in formula.nodes() {
                    if !positions.contains_key(term) {
                        return Err(SchemaError::UnknownNode {
                            context: format!("formula of '{}'", node.id),
                            node: term.to_string(),
                        });
                    }
                }
            }
        }

        let mut taxonomy = Self {
            name: definition.name.clone(),
            nodes,
            positions,
            children,
            roles: BalanceRoles::default(),
            unclassified: None,
            rules: Vec::new(),
            exact: HashMap::new(),
            pattern_order: Vec::new(),
        };

        taxonomy.compile_rules(&definition)?;
        taxonomy.unclassified = definition
            .unclassified
            .as_deref()
            .map(|id| taxonomy.leaf_target("unclassified node", id))
            .transpose()?;
        taxonomy.roles = taxonomy.resolve_roles(&definition)?;

        Ok(taxonomy)
    }

    /// Parses and loads a definition in one step.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] on parse or validation failure.
    pub fn parse(source: &str, format: SchemaFormat) -> Result<Self, SchemaError> {
        Self::load(SchemaDefinition::parse(source, format)?)
    }

    /// Parses and loads a TOML definition.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] on parse or validation failure.
    pub fn from_toml_str(source: &str) -> Result<Self, SchemaError> {
        Self::parse(source, SchemaFormat::Toml)
    }

    /// Taxonomy name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All nodes in taxonomy order.
    #[must_use]
    pub fn nodes(&self) -> &[TaxonomyNode] {
        &self.nodes
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false for a loaded taxonomy; present for API symmetry with
    /// [`len`](Self::len).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks a node up by id.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when no node has this id.
    pub fn lookup(&self, id: &str) -> Result<&TaxonomyNode, NotFoundError> {
        self.get(id).ok_or_else(|| NotFoundError(id.to_string()))
    }

    /// Looks a node up by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&TaxonomyNode> {
        self.position(id).map(|pos| &self.nodes[pos])
    }

    /// Position of a node in taxonomy order.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Direct children of a node, in declaration order.
    pub fn children(&self, id: &str) -> impl Iterator<Item = &TaxonomyNode> {
        self.position(id)
            .map(|pos| self.children[pos].as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&child| &self.nodes[child])
    }

    /// Positions of the direct children of the node at `pos`.
    #[must_use]
    pub fn child_positions(&self, pos: usize) -> &[usize] {
        self.children.get(pos).map_or(&[], Vec::as_slice)
    }

    /// Whether the node exists and has no children.
    #[must_use]
    pub fn is_leaf(&self, id: &str) -> bool {
        self.position(id)
            .is_some_and(|pos| self.children[pos].is_empty())
    }

    /// Whether `ancestor` is a strict ancestor of `id`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: &str, id: &str) -> bool {
        let mut current = self.get(id).and_then(|node| node.parent.as_ref());
        while let Some(parent) = current {
            if parent.as_str() == ancestor {
                return true;
            }
            current = self.get(parent.as_str()).and_then(|node| node.parent.as_ref());
        }
        false
    }

    /// Balance identity roles.
    #[must_use]
    pub fn roles(&self) -> &BalanceRoles {
        &self.roles
    }

    /// Fallback node for unmatched records, if declared.
    #[must_use]
    pub fn unclassified(&self) -> Option<&NodeId> {
        self.unclassified.as_ref()
    }

    /// All rules in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[IndexedRule] {
        &self.rules
    }

    /// Rules that can send amounts to `id`, in declaration order.
    pub fn rules_for<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a IndexedRule> + 'a {
        self.rules
            .iter()
            .filter(move |indexed| indexed.rule.targets().iter().any(|t| t.as_str() == id))
    }

    /// Exact-tier rule for a normalized code.
    #[must_use]
    pub fn exact_rule(&self, code: &str) -> Option<&IndexedRule> {
        self.exact.get(code).map(|&idx| &self.rules[idx])
    }

    /// Pattern-tier rules in precedence order: prefixes (longest first), then
    /// code patterns, then description rules; ties in declaration order.
    pub fn pattern_rules(&self) -> impl Iterator<Item = &IndexedRule> {
        self.pattern_order.iter().map(|&idx| &self.rules[idx])
    }

    fn leaf_target(&self, context: &str, id: &str) -> Result<NodeId, SchemaError> {
        if self.position(id).is_none() {
            return Err(SchemaError::UnknownNode {
                context: context.to_string(),
                node: id.to_string(),
            });
        }
        if !self.is_leaf(id) {
            return Err(SchemaError::BranchTarget(id.to_string()));
        }
        Ok(NodeId::new(id))
    }

    fn compile_rules(&mut self, definition: &SchemaDefinition) -> Result<(), SchemaError> {
        let mut rules = Vec::new();

        for def in &definition.nodes {
            if !def.has_rules() {
                continue;
            }
            let node = self.leaf_target("rule", &def.id)?;
            compile_node_rules(def, &node, &mut rules)?;
        }

        for entry in &definition.lookup {
            let node = self.leaf_target(&format!("lookup for code '{}'", entry.code), &entry.node)?;
            let code = normalize_code(&entry.code);
            if code.is_empty() {
                return Err(SchemaError::EmptyRule {
                    kind: "lookup code",
                    node: entry.node.clone(),
                });
            }
            rules.push(MatchRule::ExactCode { code, node });
        }

        for entry in &definition.split {
            let code = normalize_code(&entry.code);
            let mut shares = Vec::with_capacity(entry.shares.len());
            for share in &entry.shares {
                let node =
                    self.leaf_target(&format!("split for code '{}'", entry.code), &share.node)?;
                shares.push(Share {
                    node,
                    ratio: share.ratio,
                });
            }
            let total: Decimal = shares.iter().map(|share| share.ratio).sum();
            if code.is_empty()
                || shares.is_empty()
                || shares.iter().any(|share| share.ratio <= Decimal::ZERO)
                || total != Decimal::ONE
            {
                return Err(SchemaError::InvalidSplit { code, total });
            }
            rules.push(MatchRule::SplitRule { code, shares });
        }

        let mut exact = HashMap::new();
        for (idx, rule) in rules.iter().enumerate() {
            let code = match rule {
                MatchRule::ExactCode { code, .. } | MatchRule::SplitRule { code, .. } => code,
                _ => continue,
            };
            if exact.insert(code.clone(), idx).is_some() {
                return Err(SchemaError::DuplicateCode(code.clone()));
            }
        }

        let mut pattern_order: Vec<usize> = rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule.pattern_class().is_some())
            .map(|(idx, _)| idx)
            .collect();
        pattern_order.sort_by_key(|&idx| {
            let rule = &rules[idx];
            (rule.pattern_class(), Reverse(rule.prefix_len()), idx)
        });

        self.rules = rules
            .into_iter()
            .enumerate()
            .map(|(index, rule)| IndexedRule { index, rule })
            .collect();
        self.exact = exact;
        self.pattern_order = pattern_order;
        Ok(())
    }

    fn resolve_roles(&self, definition: &SchemaDefinition) -> Result<BalanceRoles, SchemaError> {
        let balance = &definition.balance;
        let resolve = |role: &str, id: Option<&str>| -> Result<Option<NodeId>, SchemaError> {
            match id {
                None => Ok(None),
                Some(id) if self.position(id).is_some() => Ok(Some(NodeId::new(id))),
                Some(id) => Err(SchemaError::UnknownNode {
                    context: format!("balance role '{role}'"),
                    node: id.to_string(),
                }),
            }
        };
        let roles = BalanceRoles {
            assets: resolve("assets", balance.assets.as_deref())?,
            liabilities: resolve("liabilities", balance.liabilities.as_deref())?,
            equity: resolve("equity", balance.equity.as_deref())?,
            income: resolve("income", balance.income.as_deref())?,
            expenses: resolve("expenses", balance.expenses.as_deref())?,
        };

        let declared: Vec<_> = roles.declared().collect();
        for (i, (role_a, a)) in declared.iter().enumerate() {
            for (role_b, b) in &declared[i + 1..] {
                if a == b
                    || self.is_ancestor(a.as_str(), b.as_str())
                    || self.is_ancestor(b.as_str(), a.as_str())
                {
                    return Err(SchemaError::OverlappingRoles(
                        (*role_a).to_string(),
                        (*role_b).to_string(),
                    ));
                }
            }
        }
        Ok(roles)
    }
}

fn index_declarations(nodes: &[NodeDefinition]) -> Result<HashMap<&str, usize>, SchemaError> {
    let mut declared = HashMap::with_capacity(nodes.len());
    for (idx, def) in nodes.iter().enumerate() {
        if !NodeId::new(&def.id).is_well_formed() {
            return Err(SchemaError::InvalidNodeId(def.id.clone()));
        }
        if declared.insert(def.id.as_str(), idx).is_some() {
            return Err(SchemaError::DuplicateNode(def.id.clone()));
        }
    }
    Ok(declared)
}

fn check_parents(
    nodes: &[NodeDefinition],
    declared: &HashMap<&str, usize>,
) -> Result<(), SchemaError> {
    for def in nodes {
        if let Some(parent) = &def.parent {
            if !declared.contains_key(parent.as_str()) {
                return Err(SchemaError::UnknownNode {
                    context: format!("parent of '{}'", def.id),
                    node: parent.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Walks up from every node; a walk longer than the node count must loop.
fn check_acyclic(
    nodes: &[NodeDefinition],
    declared: &HashMap<&str, usize>,
) -> Result<(), SchemaError> {
    let mut acyclic: HashSet<usize> = HashSet::with_capacity(nodes.len());
    for start in 0..nodes.len() {
        let mut path = Vec::new();
        let mut current = Some(start);
        while let Some(idx) = current {
            if acyclic.contains(&idx) {
                break;
            }
            if path.len() > nodes.len() || path.contains(&idx) {
                return Err(SchemaError::Cycle(nodes[idx].id.clone()));
            }
            path.push(idx);
            current = nodes[idx]
                .parent
                .as_deref()
                .and_then(|parent| declared.get(parent).copied());
        }
        acyclic.extend(path);
    }
    Ok(())
}

/// Depth-first pre-order over declaration indices.
fn preorder(nodes: &[NodeDefinition], declared: &HashMap<&str, usize>) -> Vec<usize> {
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut roots = Vec::new();
    for (idx, def) in nodes.iter().enumerate() {
        match def.parent.as_deref().and_then(|parent| declared.get(parent)) {
            Some(&parent) => children[parent].push(idx),
            None => roots.push(idx),
        }
    }

    let mut order = Vec::with_capacity(nodes.len());
    let mut stack: Vec<usize> = roots.into_iter().rev().collect();
    while let Some(idx) = stack.pop() {
        order.push(idx);
        stack.extend(children[idx].iter().rev());
    }
    order
}

fn compile_node_rules(
    def: &NodeDefinition,
    node: &NodeId,
    rules: &mut Vec<MatchRule>,
) -> Result<(), SchemaError> {
    let empty = |kind: &'static str| SchemaError::EmptyRule {
        kind,
        node: def.id.clone(),
    };

    for raw in &def.codes {
        let code = normalize_code(raw);
        if code.is_empty() {
            return Err(empty("code"));
        }
        rules.push(MatchRule::ExactCode {
            code,
            node: node.clone(),
        });
    }
    for raw in &def.prefixes {
        let prefix = normalize_code(raw);
        if prefix.is_empty() {
            return Err(empty("prefix"));
        }
        rules.push(MatchRule::PrefixPattern {
            prefix,
            node: node.clone(),
        });
    }
    for pattern in &def.code_patterns {
        rules.push(MatchRule::KeywordRegex {
            matcher: TextMatcher::CodeRegex(compile_pattern(def, pattern)?),
            node: node.clone(),
        });
    }
    for raw in &def.keywords {
        let keyword = raw.trim().to_lowercase();
        if keyword.is_empty() {
            return Err(empty("keyword"));
        }
        rules.push(MatchRule::KeywordRegex {
            matcher: TextMatcher::DescriptionKeyword(keyword),
            node: node.clone(),
        });
    }
    for pattern in &def.description_patterns {
        rules.push(MatchRule::KeywordRegex {
            matcher: TextMatcher::DescriptionRegex(compile_pattern(def, pattern)?),
            node: node.clone(),
        });
    }
    Ok(())
}

fn compile_pattern(def: &NodeDefinition, pattern: &str) -> Result<Regex, SchemaError> {
    if pattern.trim().is_empty() {
        return Err(SchemaError::EmptyRule {
            kind: "pattern",
            node: def.id.clone(),
        });
    }
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| SchemaError::InvalidPattern {
            node: def.id.clone(),
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}
