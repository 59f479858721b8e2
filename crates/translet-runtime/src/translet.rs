//! Interface implemented by compiled stylesheets.
use crate::consts::CURRENT_TRANSLET_VERSION;
use crate::context::TransformContext;
use crate::context::names::NameTable;
use crate::error::Error;
use crate::model::TreeNode;
use crate::serializer::{OutputSettings, SerializationHandler};

/// A compiled stylesheet. The runtime calls [`CompiledTranslet::transform`] with a context
/// that has been initialized for this translet.
pub trait CompiledTranslet<N: TreeNode> {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Version of the compiler that produced the translet.
    fn version(&self) -> u32 {
        CURRENT_TRANSLET_VERSION
    }

    /// Encoded names of translets older than the split-array layout.
    fn legacy_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Name, URI and node kind arrays of current translets.
    fn name_table(&self) -> NameTable {
        NameTable::default()
    }

    /// Namespace URIs referenced by the compiled code, by index.
    fn namespaces(&self) -> Vec<String> {
        Vec::new()
    }

    /// Whether the stylesheet calls `id()`, which requires the ID index to be built.
    fn has_id_call(&self) -> bool {
        false
    }

    /// Settings from `xsl:output`, when the stylesheet declares any.
    fn output_settings(&self) -> Option<OutputSettings> {
        None
    }

    /// Template body: walk `document` and emit the result to `handler`.
    fn transform(
        &self,
        ctx: &mut TransformContext<N>,
        document: &N,
        handler: &mut dyn SerializationHandler,
    ) -> Result<(), Error>;
}
