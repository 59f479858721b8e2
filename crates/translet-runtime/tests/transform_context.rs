use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rstest::{fixture, rstest};
use translet_runtime::consts::{CURRENT_TRANSLET_VERSION, ID_INDEX_NAME};
use translet_runtime::context::{CachingDocumentLoader, CollectingMessageHandler, NameTable};
use translet_runtime::test_support::RecordingHandler;
use translet_runtime::{
    CompiledTranslet, Error, ErrorCode, ExpandedName, ExternalFunctions, FaultClass, NodeKind, OutputMethod,
    OutputSettings, SerializationHandler, SimpleNode, TransformContext, TreeNode, Value, attr, elem, simple_doc,
    text,
};

/// `<book><ch id="c1">One</ch><ch xml:id="c2">Two</ch><ch id="c3">Three</ch></book>`
#[fixture]
fn book() -> SimpleNode {
    simple_doc()
        .child(
            elem("book")
                .child(elem("ch").attr(attr("id", "c1")).child(text("One")))
                .child(elem("ch").attr(attr("xml:id", "c2")).child(text("Two")))
                .child(elem("ch").attr(attr("id", "c3")).child(text("Three"))),
        )
        .build()
}

fn chapters(doc: &SimpleNode) -> Vec<SimpleNode> {
    doc.children()[0].children()
}

/// Indexes chapters by their text, emits the chapters found through `id()` and a key.
struct ChapterTranslet {
    version: u32,
    fail: bool,
    ran: AtomicBool,
}

impl ChapterTranslet {
    fn new() -> Self {
        Self { version: CURRENT_TRANSLET_VERSION, fail: false, ran: AtomicBool::new(false) }
    }
}

impl CompiledTranslet<SimpleNode> for ChapterTranslet {
    fn name(&self) -> &str {
        "chapters"
    }

    fn version(&self) -> u32 {
        self.version
    }

    fn legacy_names(&self) -> Vec<String> {
        vec!["urn:book:ch".into(), "urn:book:@id".into()]
    }

    fn name_table(&self) -> NameTable {
        NameTable::split(vec!["ch".into()], vec![String::new()], vec![NodeKind::Element])
    }

    fn has_id_call(&self) -> bool {
        true
    }

    fn output_settings(&self) -> Option<OutputSettings> {
        Some(OutputSettings::default().with_method(OutputMethod::Xml).with_indent(true))
    }

    fn transform(
        &self,
        ctx: &mut TransformContext<SimpleNode>,
        document: &SimpleNode,
        handler: &mut dyn SerializationHandler,
    ) -> Result<(), Error> {
        self.ran.store(true, Ordering::SeqCst);
        for ch in chapters(document) {
            let title = ch.string_value();
            ctx.build_key_index("title", ch, &title);
        }
        handler.start_document()?;
        for ch in ctx.lookup_id("c3 c1").iter() {
            handler.characters(&ch.string_value())?;
        }
        for ch in ctx.lookup_key("title", "Two").iter() {
            handler.characters(&ch.string_value())?;
        }
        if self.fail {
            return ctx.display_message("giving up", true);
        }
        handler.end_document()
    }
}

#[rstest]
fn transform_runs_the_body_and_clears_indexes(book: SimpleNode) {
    let translet = ChapterTranslet::new();
    let mut ctx = TransformContext::new();
    let mut out = RecordingHandler::default();
    ctx.transform(&translet, &book, &mut out).unwrap();
    assert_eq!(out.events, vec!["start-document", "text One", "text Three", "text Two", "end-document"]);
    assert!(out.settings.contains(&"indent=true".to_string()));
    assert!(!ctx.has_key_index("title"));
    assert!(!ctx.has_key_index(ID_INDEX_NAME));
    assert!(ctx.lookup_key("title", "Two").is_empty());
}

#[rstest]
fn indexes_are_cleared_when_the_body_fails(book: SimpleNode) {
    let translet = ChapterTranslet { fail: true, ..ChapterTranslet::new() };
    let messages = CollectingMessageHandler::new();
    let mut ctx = TransformContext::builder().with_message_handler(Arc::new(messages.clone())).build();
    let err = ctx.transform(&translet, &book, &mut RecordingHandler::default()).unwrap_err();
    assert_eq!(err.code, ErrorCode::TERMINATE);
    assert_eq!(messages.messages(), vec!["giving up".to_string()]);
    assert!(!ctx.has_key_index("title"));
}

#[rstest]
fn newer_translets_fail_before_the_body_runs(book: SimpleNode) {
    let translet = ChapterTranslet { version: CURRENT_TRANSLET_VERSION + 1, ..ChapterTranslet::new() };
    let mut ctx = TransformContext::new();
    let mut out = RecordingHandler::default();
    let err = ctx.transform(&translet, &book, &mut out).unwrap_err();
    assert_eq!(err.code, ErrorCode::UNKNOWN_TRANSLET_VERSION_ERR);
    assert_eq!(err.class(), FaultClass::Version);
    assert!(!translet.ran.load(Ordering::SeqCst));
    assert!(out.events.is_empty());
}

#[rstest]
fn reused_contexts_check_every_translet(book: SimpleNode) {
    let mut ctx = TransformContext::new();
    ctx.transform(&ChapterTranslet::new(), &book, &mut RecordingHandler::default()).unwrap();

    let newer = ChapterTranslet { version: CURRENT_TRANSLET_VERSION + 1, ..ChapterTranslet::new() };
    let mut out = RecordingHandler::default();
    let err = ctx.transform(&newer, &book, &mut out).unwrap_err();
    assert_eq!(err.code, ErrorCode::UNKNOWN_TRANSLET_VERSION_ERR);
    assert!(!newer.ran.load(Ordering::SeqCst));
    assert!(out.events.is_empty());

    let legacy = ChapterTranslet { version: 100, ..ChapterTranslet::new() };
    ctx.transform(&legacy, &book, &mut RecordingHandler::default()).unwrap();
    assert!(legacy.ran.load(Ordering::SeqCst));
    assert_eq!(ctx.names().unwrap().names, vec!["ch", "id"]);
}

#[rstest]
#[case(100, "id")]
#[case(CURRENT_TRANSLET_VERSION, "ch")]
fn name_tables_depend_on_the_translet_version(#[case] version: u32, #[case] last_name: &str) {
    let translet = ChapterTranslet { version, ..ChapterTranslet::new() };
    let mut ctx: TransformContext<SimpleNode> = TransformContext::new();
    ctx.post_initialization(&translet).unwrap();
    let names = ctx.names().unwrap();
    assert_eq!(names.names.last().map(String::as_str), Some(last_name));
    assert_eq!(ctx.output_settings().method, Some(OutputMethod::Xml));
}

#[rstest]
fn lazy_id_index_answers_from_the_tree(book: SimpleNode) {
    let mut ctx = TransformContext::builder().with_lazy_id_index(true).build();
    ctx.prepass_document(&book, true);
    let found: Vec<String> = ctx.lookup_id("c2").iter().map(TreeNode::string_value).collect();
    assert_eq!(found, vec!["Two"]);
    assert!(ctx.lookup_id("nope").is_empty());
}

#[rstest]
fn eager_id_index_keeps_document_order(book: SimpleNode) {
    let mut ctx = TransformContext::new();
    ctx.prepass_document(&book, true);
    let found = ctx.lookup_id(" c3\tc2 c3 ");
    assert_eq!(found.nodes(), &chapters(&book)[1..]);
}

#[test]
fn parameters_are_cleared_between_transforms() {
    let translet = ChapterTranslet::new();
    let mut ctx = TransformContext::new();
    ctx.add_parameter("p", Value::Number(1.0), false);
    ctx.push_param_frame();
    ctx.transform(&translet, &book(), &mut RecordingHandler::default()).unwrap();
    assert!(ctx.get_parameter("p").is_none());
    assert_eq!(ctx.params().depth(), 0);
}

#[test]
fn parameter_bindings_report_the_effective_value() {
    let mut ctx: TransformContext<SimpleNode> = TransformContext::new();
    ctx.add_parameter("size", Value::Number(3.0), false);
    let effective = ctx.add_parameter("size", Value::Number(10.0), true).clone();
    assert_eq!(effective, Value::Number(3.0));
}

#[test]
fn documents_resolve_relative_to_the_base() {
    let loader = |uri: &str| -> Result<Option<SimpleNode>, Error> {
        Ok((uri == "file:///data/other.xml").then(|| simple_doc().child(elem("other")).build()))
    };
    let cache = Arc::new(CachingDocumentLoader::<SimpleNode, _>::new(loader));
    let ctx = TransformContext::builder().with_document_cache(cache).with_base_uri("file:///data/main.xml").build();
    let first = ctx.document("other.xml", None).unwrap();
    let again = ctx.document("other.xml", Some("file:///data/")).unwrap();
    assert_eq!(first, again);
    let err = ctx.document("missing.xml", None).unwrap_err();
    assert_eq!(err.code, ErrorCode::DOCUMENT_RESOLVE_ERR);
    assert_eq!(err.args, vec!["file:///data/missing.xml".to_string()]);
}

#[test]
fn documents_without_a_cache_are_unresolved() {
    let ctx: TransformContext<SimpleNode> = TransformContext::new();
    assert_eq!(ctx.document("a.xml", None).unwrap_err().code, ErrorCode::DOCUMENT_RESOLVE_ERR);
}

#[test]
fn external_functions_and_auxiliary_classes() {
    let mut functions = ExternalFunctions::new();
    functions.register_ns("urn:math", "twice", 1, |args: &[Value<SimpleNode>]| match args {
        [Value::Number(n)] => Ok(Value::Number(n * 2.0)),
        _ => Ok(Value::Number(f64::NAN)),
    });
    let ctx = TransformContext::builder()
        .with_functions(Arc::new(functions))
        .with_auxiliary_class("dom", Arc::new(42u32))
        .build();
    let twice = ExpandedName::new(Some("urn:math"), "twice");
    assert_eq!(ctx.call_external(&twice, &[Value::Number(4.0)]).unwrap(), Value::Number(8.0));
    let err = ctx.call_external(&ExpandedName::new(Some("urn:math"), "half"), &[]).unwrap_err();
    assert_eq!(err.code, ErrorCode::EXTERNAL_FUNC_ERR);
    let class = ctx.auxiliary_class("dom").unwrap();
    assert_eq!(class.downcast_ref::<u32>(), Some(&42));
    assert!(ctx.auxiliary_class("other").is_none());
}

#[test]
fn messages_without_terminate_continue() {
    let messages = CollectingMessageHandler::new();
    let ctx: TransformContext<SimpleNode> =
        TransformContext::builder().with_message_handler(Arc::new(messages.clone())).build();
    ctx.display_message("hello", false).unwrap();
    assert_eq!(messages.messages(), vec!["hello".to_string()]);
}

#[test]
fn scratch_formatting_and_generated_prefixes() {
    let mut ctx: TransformContext<SimpleNode> = TransformContext::new();
    assert_eq!(ctx.format_number(1e21), "1000000000000000000000");
    let mut out = RecordingHandler::default();
    let scope = elem("r").build();
    assert_eq!(ctx.start_element("e", Some("urn:x"), &mut out, &scope).unwrap(), "ns0:e");
    assert_eq!(ctx.start_element("f", Some("urn:x"), &mut out, &scope).unwrap(), "ns1:f");
}
