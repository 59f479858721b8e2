//! Per-transformation state: parameters, key indexes, secondary outputs and documents.
//!
//! A [`TransformContext`] is owned by one transformation at a time. Methods take
//! `&mut self`; run concurrent transformations on separate contexts.
pub mod documents;
pub mod keys;
pub mod messages;
pub mod names;
pub mod output;
pub mod params;

use std::any::Any;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use itertools::Itertools;
use tracing::{debug, debug_span, warn};

use crate::algebra::copy::{PrefixGenerator, start_element};
use crate::algebra::names::NamespaceResolver;
use crate::algebra::numeric::FormatBuffer;
use crate::consts::{CURRENT_TRANSLET_VERSION, ID_INDEX_NAME};
use crate::error::{Error, ErrorCode};
use crate::functions::{ExpandedName, ExternalFunctions};
use crate::model::TreeNode;
use crate::node_set::NodeSet;
use crate::serializer::{HandlerFactory, OutputSettings, SerializationHandler};
use crate::translet::CompiledTranslet;
use crate::value::Value;

pub use documents::{CachingDocumentLoader, DocumentCache, DocumentLoader, resolve_uri};
pub use keys::{EagerKeyIndex, KeyIndex, KeyIndexes, KeySource, LazyKeyIndex, TreeIdSource};
pub use messages::{CollectingMessageHandler, MessageHandler, TracingMessageHandler};
pub use names::NameTable;
pub use output::OutputHandle;
pub use params::{Parameter, ParameterStack};

pub type AuxiliaryClass = Arc<dyn Any + Send + Sync>;

pub struct TransformContext<N: TreeNode + 'static> {
    params: ParameterStack<N>,
    keys: KeyIndexes<N>,
    documents: Option<Arc<dyn DocumentCache<N>>>,
    handler_factory: Option<Arc<dyn HandlerFactory>>,
    messages: Arc<dyn MessageHandler>,
    functions: Arc<ExternalFunctions<N>>,
    output: OutputSettings,
    default_output: OutputSettings,
    aux_classes: HashMap<String, AuxiliaryClass>,
    names: Option<NameTable>,
    initialized_for: Option<(String, u32)>,
    namespaces: Vec<String>,
    base_uri: Option<String>,
    lazy_id_index: bool,
    format: FormatBuffer,
    prefixes: PrefixGenerator,
}

impl<N: TreeNode + 'static> Default for TransformContext<N> {
    fn default() -> Self {
        Self {
            params: ParameterStack::new(),
            keys: KeyIndexes::new(),
            documents: None,
            handler_factory: None,
            messages: Arc::new(TracingMessageHandler),
            functions: Arc::new(ExternalFunctions::new()),
            output: OutputSettings::default(),
            default_output: OutputSettings::default(),
            aux_classes: HashMap::new(),
            names: None,
            initialized_for: None,
            namespaces: Vec::new(),
            base_uri: None,
            lazy_id_index: false,
            format: FormatBuffer::new(),
            prefixes: PrefixGenerator::new(),
        }
    }
}

impl<N: TreeNode + 'static> TransformContext<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> TransformContextBuilder<N> {
        TransformContextBuilder::new()
    }

    // ----- initialization -------------------------------------------------

    /// Check the translet's version and normalize its name tables. The version is checked on
    /// every call; the tables are rebuilt only when a different translet is passed in.
    pub fn post_initialization<T>(&mut self, translet: &T) -> Result<(), Error>
    where
        T: CompiledTranslet<N> + ?Sized,
    {
        let version = translet.version();
        if version > CURRENT_TRANSLET_VERSION {
            warn!(translet = translet.name(), version, supported = CURRENT_TRANSLET_VERSION, "translet too new");
            return Err(Error::from_code(ErrorCode::UNKNOWN_TRANSLET_VERSION_ERR, [translet.name()]));
        }
        if self.initialized_for.as_ref().is_some_and(|(name, v)| name == translet.name() && *v == version) {
            return Ok(());
        }
        let table = names::normalize_names(translet.name(), version, &translet.legacy_names(), || {
            translet.name_table()
        })?;
        debug!(translet = translet.name(), version, names = table.len(), "translet initialized");
        self.names = Some(table);
        self.namespaces = translet.namespaces();
        self.output = translet.output_settings().unwrap_or_else(|| self.default_output.clone());
        self.initialized_for = Some((translet.name().to_string(), version));
        Ok(())
    }

    /// Effective name table, once initialized.
    pub fn names(&self) -> Option<&NameTable> {
        self.names.as_ref()
    }

    pub fn namespace_array(&self) -> &[String] {
        &self.namespaces
    }

    pub fn output_settings(&self) -> &OutputSettings {
        &self.output
    }

    // ----- transformation -------------------------------------------------

    /// Run `translet` over `document`, writing to `handler`. Key indexes are discarded when
    /// this returns, whether the body succeeded or not.
    pub fn transform<T>(
        &mut self,
        translet: &T,
        document: &N,
        handler: &mut dyn SerializationHandler,
    ) -> Result<(), Error>
    where
        T: CompiledTranslet<N> + ?Sized,
    {
        let span = debug_span!("transform", translet = translet.name());
        let _guard = span.enter();
        self.post_initialization(translet)?;
        self.params.clear();
        let result = self.run(translet, document, handler);
        self.keys.clear();
        match &result {
            Ok(()) => debug!("transform finished"),
            Err(e) => debug!(code = %e.code, "transform failed"),
        }
        result
    }

    fn run<T>(&mut self, translet: &T, document: &N, handler: &mut dyn SerializationHandler) -> Result<(), Error>
    where
        T: CompiledTranslet<N> + ?Sized,
    {
        self.prepass_document(document, translet.has_id_call());
        self.output.transfer_to(handler);
        translet.transform(self, document, handler)
    }

    /// Prepare indexes for `document`: scope key lookups to it and, when `build_ids` is set,
    /// index its ID attributes (or register a lazy ID index).
    pub fn prepass_document(&mut self, document: &N, build_ids: bool) {
        self.keys.set_root(document);
        if !build_ids {
            return;
        }
        if self.lazy_id_index {
            self.keys.build_lazy(ID_INDEX_NAME, Arc::new(TreeIdSource::new(document)));
            return;
        }
        let mut count = 0usize;
        for (id, element) in keys::elements_with_ids(document).into_iter().unique_by(|(id, _)| id.clone()) {
            self.keys.build(ID_INDEX_NAME, element, &id);
            count += 1;
        }
        debug!(ids = count, "id index built");
    }

    // ----- parameters -----------------------------------------------------

    pub fn push_param_frame(&mut self) {
        self.params.push_frame();
    }

    pub fn pop_param_frame(&mut self) {
        self.params.pop_frame();
    }

    /// Bind a template parameter; returns the value now in effect.
    pub fn add_parameter(&mut self, name: &str, value: Value<N>, is_default: bool) -> &Value<N> {
        self.params.bind(name, value, is_default)
    }

    pub fn get_parameter(&self, name: &str) -> Option<&Value<N>> {
        self.params.lookup(name)
    }

    pub fn clear_parameters(&mut self) {
        self.params.clear();
    }

    pub fn params(&self) -> &ParameterStack<N> {
        &self.params
    }

    // ----- keys -----------------------------------------------------------

    pub fn build_key_index(&mut self, name: &str, node: N, value: &str) {
        self.keys.build(name, node, value);
    }

    pub fn build_lazy_key_index(&mut self, name: &str, source: Arc<dyn KeySource<N>>) {
        self.keys.build_lazy(name, source);
    }

    pub fn set_root_for_keys(&mut self, node: &N) {
        self.keys.set_root(node);
    }

    pub fn lookup_key(&self, name: &str, value: &str) -> NodeSet<N> {
        NodeSet::new(self.keys.lookup(name, value))
    }

    pub fn lookup_id(&self, values: &str) -> NodeSet<N> {
        NodeSet::new(self.keys.lookup_id(values))
    }

    pub fn has_key_index(&self, name: &str) -> bool {
        self.keys.contains(name)
    }

    // ----- documents and outputs -----------------------------------------

    /// `document(href)`: resolve against `base` (or the context base URI) and fetch through
    /// the document cache.
    pub fn document(&self, href: &str, base: Option<&str>) -> Result<N, Error> {
        let uri = resolve_uri(href, base.or(self.base_uri.as_deref()))?;
        let cache = self.documents.as_ref().ok_or_else(|| Error::from_code(ErrorCode::DOCUMENT_RESOLVE_ERR, [&uri]))?;
        cache.retrieve(&uri)?.ok_or_else(|| Error::from_code(ErrorCode::DOCUMENT_RESOLVE_ERR, [uri]))
    }

    pub fn open_output(&self, path: impl AsRef<Path>, append: bool) -> Result<OutputHandle, Error> {
        let path = path.as_ref();
        let factory = self
            .handler_factory
            .as_deref()
            .ok_or_else(|| Error::from_code(ErrorCode::OUTPUT_ERR, [path.display().to_string()]))?;
        output::open_output(path, append, factory, &self.output)
    }

    pub fn close_output(&self, handle: OutputHandle) -> Result<(), Error> {
        handle.close()
    }

    // ----- result construction --------------------------------------------

    /// Start an element whose name is computed at run time; see [`start_element`].
    pub fn start_element(
        &mut self,
        qname: &str,
        namespace: Option<&str>,
        handler: &mut dyn SerializationHandler,
        resolver: &dyn NamespaceResolver,
    ) -> Result<String, Error> {
        start_element(qname, namespace, handler, resolver, &mut self.prefixes)
    }

    /// Format a number into the context's scratch buffer.
    pub fn format_number(&mut self, d: f64) -> &str {
        self.format.format(d)
    }

    // ----- extension hooks ------------------------------------------------

    pub fn add_auxiliary_class(&mut self, name: impl Into<String>, class: AuxiliaryClass) {
        self.aux_classes.insert(name.into(), class);
    }

    pub fn auxiliary_class(&self, name: &str) -> Option<&AuxiliaryClass> {
        self.aux_classes.get(name)
    }

    pub fn call_external(&self, name: &ExpandedName, args: &[Value<N>]) -> Result<Value<N>, Error> {
        self.functions.call(name, args)
    }

    /// `xsl:message`. With `terminate` the message is still shown, then a `TERMINATE`
    /// fault stops the transformation.
    pub fn display_message(&self, message: &str, terminate: bool) -> Result<(), Error> {
        self.messages.display(message);
        if terminate {
            return Err(Error::from_code(ErrorCode::TERMINATE, [message]));
        }
        Ok(())
    }
}

pub struct TransformContextBuilder<N: TreeNode + 'static> {
    ctx: TransformContext<N>,
}

impl<N: TreeNode + 'static> Default for TransformContextBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: TreeNode + 'static> TransformContextBuilder<N> {
    pub fn new() -> Self {
        Self { ctx: TransformContext::default() }
    }

    pub fn with_document_cache(mut self, cache: Arc<dyn DocumentCache<N>>) -> Self {
        self.ctx.documents = Some(cache);
        self
    }

    pub fn with_handler_factory(mut self, factory: Arc<dyn HandlerFactory>) -> Self {
        self.ctx.handler_factory = Some(factory);
        self
    }

    pub fn with_message_handler(mut self, handler: Arc<dyn MessageHandler>) -> Self {
        self.ctx.messages = handler;
        self
    }

    pub fn with_functions(mut self, functions: Arc<ExternalFunctions<N>>) -> Self {
        self.ctx.functions = functions;
        self
    }

    /// Default output settings; replaced by the translet's own `xsl:output`, if any.
    pub fn with_output_settings(mut self, settings: OutputSettings) -> Self {
        self.ctx.default_output = settings.clone();
        self.ctx.output = settings;
        self
    }

    pub fn with_base_uri(mut self, base: impl Into<String>) -> Self {
        self.ctx.base_uri = Some(base.into());
        self
    }

    /// Answer `id()` from the tree on each call instead of indexing the document up front.
    pub fn with_lazy_id_index(mut self, lazy: bool) -> Self {
        self.ctx.lazy_id_index = lazy;
        self
    }

    pub fn with_auxiliary_class(mut self, name: impl Into<String>, class: AuxiliaryClass) -> Self {
        self.ctx.add_auxiliary_class(name, class);
        self
    }

    pub fn build(self) -> TransformContext<N> {
        self.ctx
    }
}
