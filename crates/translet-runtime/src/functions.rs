//! Registry of host-provided extension functions, keyed by expanded name and arity.
use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, ErrorCode};
use crate::value::Value;

pub type Arity = usize;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpandedName {
    pub ns_uri: Option<String>,
    pub local: String,
}

impl ExpandedName {
    pub fn new(ns_uri: Option<&str>, local: &str) -> Self {
        Self { ns_uri: ns_uri.map(str::to_string), local: local.to_string() }
    }
}

impl fmt::Display for ExpandedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ns_uri {
            Some(ns) => write!(f, "Q{{{}}}{}", ns, self.local),
            None => f.write_str(&self.local),
        }
    }
}

pub type ExternalFunction<N> = Arc<dyn Fn(&[Value<N>]) -> Result<Value<N>, Error> + Send + Sync>;

// (min arity, max arity or None for variadic, implementation)
type Overload<N> = (Arity, Option<Arity>, ExternalFunction<N>);

#[derive(Debug, Clone)]
pub enum ResolveError {
    Unknown(ExpandedName),
    WrongArity { name: ExpandedName, available: Vec<Arity> },
}

impl From<ResolveError> for Error {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::Unknown(name) => Error::from_code(ErrorCode::EXTERNAL_FUNC_ERR, [name.to_string()]),
            ResolveError::WrongArity { name, available } => {
                let arities = available.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
                let mut err = Error::from_code(ErrorCode::EXTERNAL_FUNC_ERR, [name.to_string()]);
                err.message = format!("{} (accepted arities: {arities})", err.message);
                err
            }
        }
    }
}

pub struct ExternalFunctions<N> {
    fns: HashMap<ExpandedName, Vec<Overload<N>>>,
}

impl<N> Default for ExternalFunctions<N> {
    fn default() -> Self {
        Self { fns: HashMap::new() }
    }
}

impl<N> fmt::Debug for ExternalFunctions<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.fns.keys()).finish()
    }
}

impl<N> ExternalFunctions<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register with an arity range; `max_arity == None` makes the function variadic.
    /// Among overlapping ranges the one with the highest minimum, then smallest maximum, wins.
    pub fn register_range(&mut self, name: ExpandedName, min_arity: Arity, max_arity: Option<Arity>, func: ExternalFunction<N>) {
        let overloads = self.fns.entry(name).or_default();
        overloads.push((min_arity, max_arity, func));
        overloads.sort_by(|a, b| {
            b.0.cmp(&a.0).then_with(|| match (a.1, b.1) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => core::cmp::Ordering::Less,
                (None, Some(_)) => core::cmp::Ordering::Greater,
                (None, None) => core::cmp::Ordering::Equal,
            })
        });
    }

    pub fn register_ns<F>(&mut self, ns_uri: &str, local: &str, arity: Arity, f: F)
    where
        F: 'static + Send + Sync + Fn(&[Value<N>]) -> Result<Value<N>, Error>,
    {
        self.register_range(ExpandedName::new(Some(ns_uri), local), arity, Some(arity), Arc::new(f));
    }

    pub fn register_ns_range<F>(&mut self, ns_uri: &str, local: &str, min_arity: Arity, max_arity: Option<Arity>, f: F)
    where
        F: 'static + Send + Sync + Fn(&[Value<N>]) -> Result<Value<N>, Error>,
    {
        self.register_range(ExpandedName::new(Some(ns_uri), local), min_arity, max_arity, Arc::new(f));
    }

    pub fn contains(&self, name: &ExpandedName) -> bool {
        self.fns.contains_key(name)
    }

    pub fn resolve(&self, name: &ExpandedName, arity: Arity) -> Result<&ExternalFunction<N>, ResolveError> {
        let Some(cands) = self.fns.get(name) else {
            return Err(ResolveError::Unknown(name.clone()));
        };
        if let Some((_, _, f)) = cands.iter().find(|(min, max, _)| arity >= *min && max.is_none_or(|m| arity <= m)) {
            return Ok(f);
        }
        let mut available: Vec<Arity> = cands.iter().filter_map(|(min, max, _)| max.map(|m| *min..=m)).flatten().collect();
        available.sort_unstable();
        available.dedup();
        Err(ResolveError::WrongArity { name: name.clone(), available })
    }

    pub fn call(&self, name: &ExpandedName, args: &[Value<N>]) -> Result<Value<N>, Error> {
        let f = self.resolve(name, args.len())?;
        f(args)
    }
}
