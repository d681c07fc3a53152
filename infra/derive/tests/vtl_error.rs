#[test]
fn vtl_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/vtl_error_pass.rs");
    t.pass("tests/ui/vtl_error_context.rs");
    t.pass("tests/ui/vtl_error_without_internal.rs");
}
