//! Merging descriptors that share an (action, subject) pair into one command.
//!
//! A group with one member becomes a direct command. Larger groups split
//! their parameters into common ones (declared by every member) and optional
//! ones, and dispatch to a member's endpoint by testing which optional
//! parameters were supplied. The member that needs no optional parameter is
//! the final, unconditional branch.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::action::Action;
use crate::command_tree::CommandDescriptor;
use crate::emit::{Body, Branch, Condition, Function, ParamDecl, RestCall, command_name};
use crate::path::{ParamType, Parameter};

/// All descriptors sharing one (action, subject) key, in discovery order.
#[derive(Debug, Clone)]
pub struct AggregationGroup<'a> {
    pub action: Action,
    pub subject: &'a str,
    pub members: Vec<&'a CommandDescriptor>,
}

/// Groups descriptors by (action, subject), keeping first-seen group order.
pub fn group_descriptors(descriptors: &[CommandDescriptor]) -> Vec<AggregationGroup<'_>> {
    let mut groups: Vec<AggregationGroup<'_>> = Vec::new();
    let mut index: HashMap<(Action, &str), usize> = HashMap::new();
    for descriptor in descriptors {
        let key = (descriptor.action, descriptor.subject.as_str());
        match index.get(&key) {
            Some(&idx) => groups[idx].members.push(descriptor),
            None => {
                index.insert(key, groups.len());
                groups.push(AggregationGroup {
                    action: descriptor.action,
                    subject: &descriptor.subject,
                    members: vec![descriptor],
                });
            }
        }
    }
    groups
}

/// Parameters of a group split by how many members declare them. The
/// subject marker is never included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterClasses<'a> {
    pub common: Vec<&'a Parameter>,
    pub optional: Vec<&'a Parameter>,
}

impl ParameterClasses<'_> {
    fn is_optional(&self, name: &str) -> bool {
        self.optional.iter().any(|p| p.name == name)
    }
}

pub fn classify_parameters<'a>(members: &[&'a CommandDescriptor]) -> ParameterClasses<'a> {
    // number of members declaring each name, not raw occurrences
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for member in members {
        let names: HashSet<&str> = member.parameters.iter().map(|p| p.name.as_str()).collect();
        for name in names {
            *counts.entry(name).or_default() += 1;
        }
    }

    let mut common: Vec<&Parameter> = Vec::new();
    let mut optional: Vec<&Parameter> = Vec::new();
    for param in members.iter().flat_map(|m| m.parameters.iter()) {
        if param.is_subject_marker() {
            continue;
        }
        let bucket = if counts[param.name.as_str()] == members.len() {
            &mut common
        } else {
            &mut optional
        };
        if !bucket.iter().any(|p| p.name == param.name) {
            bucket.push(param);
        }
    }
    ParameterClasses { common, optional }
}

/// Builds the emitted commands for descriptor groups.
pub struct Aggregator<'a> {
    prefix: &'a str,
    base_uri: &'a str,
}

impl<'a> Aggregator<'a> {
    pub fn new(prefix: &'a str, base_uri: &'a str) -> Self {
        Self { prefix, base_uri }
    }

    pub fn build_all(&self, descriptors: &[CommandDescriptor]) -> Vec<Function> {
        group_descriptors(descriptors)
            .iter()
            .map(|group| self.build(group))
            .collect()
    }

    pub fn build(&self, group: &AggregationGroup<'_>) -> Function {
        let name = command_name(group.action, self.prefix, group.subject);
        match group.members.as_slice() {
            [single] => self.build_direct(name, single),
            members => self.build_merged(name, members),
        }
    }

    fn build_direct(&self, name: String, descriptor: &CommandDescriptor) -> Function {
        let params = descriptor
            .parameters
            .iter()
            .filter(|p| !p.is_subject_marker())
            .map(declare_required)
            .collect();
        Function {
            name,
            params,
            body: Body::Call(RestCall::for_descriptor(self.base_uri, descriptor)),
        }
    }

    fn build_merged(&self, name: String, members: &[&CommandDescriptor]) -> Function {
        let classes = classify_parameters(members);

        let mut params: Vec<ParamDecl> = classes.common.iter().map(|p| declare_required(p)).collect();

        // more than one way in means the optionals are tagged with their parameter sets
        let mut set_names: Vec<&str> = Vec::new();
        for &member in members {
            let carries_optional = member.parameters.iter().any(|p| classes.is_optional(&p.name));
            if carries_optional && !set_names.contains(&member.parameter_set_name.as_str()) {
                set_names.push(&member.parameter_set_name);
            }
        }
        let tag_sets = set_names.len() > 1;
        debug!(command = %name, members = members.len(), parameter_sets = tag_sets, "merging command");

        for param in &classes.optional {
            let decl = declare(param);
            params.push(if tag_sets {
                decl.in_sets(sets_containing(members, &param.name))
            } else {
                decl
            });
        }

        let mut branches = Vec::new();
        let mut default: Option<&CommandDescriptor> = None;
        for &member in members {
            let mut conditions: Vec<Condition> = Vec::new();
            for param in member.parameters.iter().filter(|p| classes.is_optional(&p.name)) {
                let condition = if param.is_switch() {
                    Condition::Present(param.name.clone())
                } else {
                    Condition::NotNull(param.name.clone())
                };
                if !conditions.contains(&condition) {
                    conditions.push(condition);
                }
            }

            if conditions.is_empty() {
                if let Some(displaced) = default.replace(member) {
                    warn!(
                        command = %name,
                        endpoint = %displaced.endpoint,
                        "several endpoints need no optional parameter, keeping the last"
                    );
                }
            } else {
                branches.push(Branch {
                    conditions,
                    call: RestCall::for_descriptor(self.base_uri, member),
                });
            }
        }

        Function {
            name,
            params,
            body: Body::Dispatch {
                branches,
                default: default.map(|d| RestCall::for_descriptor(self.base_uri, d)),
            },
        }
    }
}

fn declare(param: &Parameter) -> ParamDecl {
    match &param.ty {
        ParamType::Switch => ParamDecl::new(&param.name, "Switch"),
        ParamType::Named(ty) if param.is_body() => ParamDecl::new(&param.name, ty),
        ParamType::Named(_) => ParamDecl::new(&param.name, "object"),
    }
}

/// Mandatory declaration for a parameter every call needs. A switch stays
/// optional since a mandatory switch could never be left off.
fn declare_required(param: &Parameter) -> ParamDecl {
    let decl = declare(param);
    if param.is_switch() {
        decl
    } else {
        decl.mandatory()
    }
}

fn sets_containing(members: &[&CommandDescriptor], name: &str) -> Vec<String> {
    let mut sets: Vec<String> = Vec::new();
    for member in members {
        if member.parameters.iter().any(|p| p.name == name) && !sets.contains(&member.parameter_set_name) {
            sets.push(member.parameter_set_name.clone());
        }
    }
    sets
}
