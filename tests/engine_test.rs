use color_eyre::Result;
use dags::interpreter::error::{Imbalance, RuntimeErrorKind};
use dags::{Engine, Options};
use indexmap::IndexMap;

type Store = IndexMap<String, String>;

fn run(engine: &mut Engine<Store>, script: &str) -> Result<String> {
    let mut output = String::new();
    engine.run_script(script, &mut output)?;
    Ok(output)
}

fn eval(script: &str) -> Result<String> {
    run(&mut Engine::in_memory(), script)
}

fn fails_with(script: &str) -> RuntimeErrorKind {
    let mut output = String::new();
    match Engine::in_memory().run_script(script, &mut output) {
        Ok(()) => panic!("{script} should fail"),
        Err(error) => error.kind,
    }
}

#[test]
fn get_reads_host_data() -> Result<()> {
    let mut store = Store::new();
    store.insert("abc".into(), "123".into());
    let mut engine = Engine::new(store);
    assert_eq!(run(&mut engine, "@get(abc)")?, "123");
    Ok(())
}

#[test]
fn set_then_get() -> Result<()> {
    let mut engine = Engine::in_memory();
    run(&mut engine, "@set(abc,123)")?;
    assert_eq!(run(&mut engine, "@get(abc)")?, "123");
    assert_eq!(engine.store().get("abc").map(String::as_str), Some("123"));

    run(&mut engine, r#"@set(abc," ")"#)?;
    assert_eq!(engine.store().get("abc").map(String::as_str), Some("null"));
    assert_eq!(run(&mut engine, "@get(abc)")?, "");
    Ok(())
}

#[test]
fn empty_script_does_nothing() -> Result<()> {
    assert_eq!(eval("")?, "");
    assert_eq!(eval("  NULL ")?, "");
    Ok(())
}

#[test]
fn arrays_store_cells_under_derived_keys() -> Result<()> {
    let mut engine = Engine::in_memory();
    run(&mut engine, "@setarray(abc,2,3,123)")?;
    assert_eq!(run(&mut engine, "@getarray(abc,2,3)")?, "123");
    assert!(engine.store().contains_key("abc[2,3]"));

    run(&mut engine, "@setarray(abc,2,3,)")?;
    assert_eq!(run(&mut engine, "@getarray(abc,2,3)")?, "");

    run(&mut engine, "@setarray(abc,0,0,\"a,b\")")?;
    assert_eq!(run(&mut engine, "@getarray(abc,0,0)")?, "a,b");
    run(&mut engine, "@cleararray(abc)")?;
    assert_eq!(run(&mut engine, "@getarray(abc,0,0)")?, "");
    assert!(engine.store().contains_key("abc[0,0]"));
    Ok(())
}

#[test]
fn lists_grow_on_demand() -> Result<()> {
    let mut engine = Engine::in_memory();
    run(&mut engine, "@setlist(abc,1,123)")?;
    assert_eq!(run(&mut engine, "@getlist(abc,1)")?, "123");
    assert_eq!(run(&mut engine, "@getlist(abc,4)")?, "");
    assert_eq!(run(&mut engine, "@listlength(abc)")?, "2");
    assert_eq!(run(&mut engine, "@get(abc)")?, "[null,123]");
    Ok(())
}

#[test]
fn list_insert_and_remove_shift_items() -> Result<()> {
    let mut engine = Engine::in_memory();
    for item in 0..4 {
        run(&mut engine, &format!("@addlist(abc,{item})"))?;
    }
    run(&mut engine, "@insertatlist(abc,1,123)")?;
    assert_eq!(run(&mut engine, "@getlist(abc,1)")?, "123");
    assert_eq!(run(&mut engine, "@getlist(abc,4)")?, "3");

    let mut engine = Engine::in_memory();
    run(&mut engine, "@setlist(abc,3,123)")?;
    run(&mut engine, "@removeatlist(abc,0)")?;
    assert_eq!(run(&mut engine, "@getlist(abc,2)")?, "123");
    run(&mut engine, "@removeatlist(abc,10)")?;
    assert_eq!(run(&mut engine, "@listlength(abc)")?, "3");

    run(&mut engine, "@clearlist(abc)")?;
    assert_eq!(run(&mut engine, "@listlength(abc)")?, "0");
    Ok(())
}

#[test]
fn negative_list_index_is_rejected() {
    assert_eq!(fails_with("@getlist(abc,-1)"), RuntimeErrorKind::InvalidIndex(-1));
}

#[test]
fn stored_macros_run_by_name() -> Result<()> {
    let mut engine = Engine::in_memory();
    run(&mut engine, r#"@set("@boo","@write(eek!)")"#)?;
    assert_eq!(run(&mut engine, "@boo")?, "eek!");

    let mut engine = Engine::in_memory();
    run(&mut engine, r#"@set("@boo(x)","@write($x)")"#)?;
    assert_eq!(run(&mut engine, "@boo(eek!)")?, "eek!");
    assert_eq!(run(&mut engine, "@BOO(eek!)")?, "eek!");
    Ok(())
}

#[test]
fn macro_arity_is_checked() -> Result<()> {
    let mut engine = Engine::in_memory();
    run(&mut engine, r#"@set("@pair(a,b)","@write($b,$a)")"#)?;
    assert_eq!(run(&mut engine, "@pair(1,2)")?, "21");

    let error = engine
        .run_script("@pair(1)", &mut String::new())
        .expect_err("one argument is not enough");
    assert_eq!(
        error.to_string().lines().next(),
        Some("Incorrect number of parameters: @pair(2) - Found: 1")
    );
    Ok(())
}

#[test]
fn arithmetic_functions() -> Result<()> {
    assert_eq!(eval("@write(@abs(1))")?, "1");
    assert_eq!(eval("@write(@abs(-1))")?, "1");
    assert_eq!(eval("@write(@add(1,3))")?, "4");
    assert_eq!(eval("@write(@sub(1,3))")?, "-2");
    assert_eq!(eval("@write(@mul(3,4))")?, "12");
    assert_eq!(eval("@write(@div(42,6))")?, "7");
    assert_eq!(eval("@write(@mod(13,4))")?, "1");
    assert_eq!(eval("@write(@mod(12,4))")?, "0");
    Ok(())
}

#[test]
fn arithmetic_statements_update_the_store() -> Result<()> {
    assert_eq!(eval("@set(value,12) @addto(value,7) @write(@get(value))")?, "19");
    assert_eq!(eval("@set(value,12) @subto(value,7) @write(@get(value))")?, "5");
    assert_eq!(eval("@set(value,3) @multo(value,4) @write(@get(value))")?, "12");
    assert_eq!(eval("@set(value,12) @divto(value,3) @write(@get(value))")?, "4");
    assert_eq!(eval("@set(value,13) @modto(value,4) @write(@get(value))")?, "1");
    Ok(())
}

#[test]
fn division_by_zero_fails() {
    assert_eq!(fails_with("@write(@div(1,0))"), RuntimeErrorKind::DivideByZero);
    assert_eq!(fails_with("@set(v,5) @modto(v,0)"), RuntimeErrorKind::DivideByZero);
}

#[test]
fn division_overflow_wraps() -> Result<()> {
    assert_eq!(
        eval("@write(@div(-9223372036854775808,-1))")?,
        "-9223372036854775808"
    );
    assert_eq!(eval("@write(@mod(-9223372036854775808,-1))")?, "0");
    Ok(())
}

#[test]
fn non_numeric_operand_names_the_key() {
    assert_eq!(
        fails_with("@set(v,abc) @addto(v,1)"),
        RuntimeErrorKind::NotNumeric("[v] abc".into())
    );
    assert_eq!(
        fails_with("@write(@add(x,1))"),
        RuntimeErrorKind::NotNumeric("x".into())
    );
}

#[test]
fn string_functions() -> Result<()> {
    assert_eq!(eval("@write(@concat(abc,def,123))")?, "abcdef123");
    assert_eq!(eval("@lower(ABC)")?, "abc");
    assert_eq!(eval("@write(@upper(abc))")?, "ABC");
    assert_eq!(eval(r#"@set(value,"   abc   ") @write(@trim(@get(value)))"#)?, "abc");
    assert_eq!(eval("@write(@replace(abcdef,d,x))")?, "abcxef");
    assert_eq!(eval("@write(@substring(abcdef,1,4))")?, "bcde");
    assert_eq!(eval("@write(@substring(abcdef,4))")?, "ef");
    assert_eq!(eval(r#"@write(@format("{0}-{1}-{2}",1,2,3))"#)?, "1-2-3");
    assert_eq!(eval(r#"@write(@format("{2}-{1}-{0}",1,2,3))"#)?, "3-2-1");
    assert_eq!(eval(r#"@write(@format("{0}-{1}-{2}",1,2))"#)?, "1-2-{2}");
    Ok(())
}

#[test]
fn comparisons() -> Result<()> {
    let cases = [
        ("eq", "42,6", "false"),
        ("eq", "42,42", "true"),
        ("ne", "42,6", "true"),
        ("ge", "42,42", "true"),
        ("ge", "1,42", "false"),
        ("gt", "42,42", "false"),
        ("le", "42,6", "false"),
        ("le", "1,42", "true"),
        ("lt", "42,42", "false"),
        ("lt", "1,42", "true"),
    ];
    for (name, args, expected) in cases {
        assert_eq!(eval(&format!("@write(@{name}({args}))"))?, expected, "{name}({args})");
    }
    Ok(())
}

#[test]
fn boolean_predicates() -> Result<()> {
    assert_eq!(eval(r#"@write(@false(""))"#)?, "true");
    assert_eq!(eval("@write(@false(0))")?, "true");
    assert_eq!(eval("@write(@false(1))")?, "false");
    assert_eq!(eval("@write(@false(abc))")?, "false");
    assert_eq!(eval("@write(@true(0))")?, "false");
    assert_eq!(eval("@write(@true(1))")?, "true");
    assert_eq!(eval("@write(@isbool(0))")?, "true");
    assert_eq!(eval("@write(@isbool(notboolean))")?, "false");
    assert_eq!(eval("@write(@isnull(null))")?, "true");
    assert_eq!(eval("@write(@isnull(abc))")?, "false");
    assert_eq!(eval("@write(@isnull(@get(value)))")?, "true");
    assert_eq!(eval("@write(@isscript(abc))")?, "false");
    assert_eq!(eval(r#"@write(@isscript("@get(value)"))"#)?, "true");
    Ok(())
}

#[test]
fn data_predicates_read_the_store() -> Result<()> {
    let cases = [
        ("falsedata", "\"\"", "true"),
        ("falsedata", "false", "true"),
        ("falsedata", "abc", "false"),
        ("truedata", "0", "false"),
        ("truedata", "1", "true"),
        ("isbooldata", "1", "true"),
        ("isbooldata", "notboolean", "false"),
        ("isnulldata", "null", "true"),
        ("isnulldata", "\"\"", "true"),
        ("isnulldata", "abc", "false"),
        ("isscriptdata", "abc", "false"),
        ("isscriptdata", "\"@get(value)\"", "true"),
    ];
    for (name, stored, expected) in cases {
        let script = format!("@set(test.value,{stored}) @write(@{name}(test.value))");
        assert_eq!(eval(&script)?, expected, "{script}");
    }
    Ok(())
}

#[test]
fn output_statements() -> Result<()> {
    assert_eq!(eval("@set(value,abcdef) @msg(value)")?, "abcdef\\n");
    assert_eq!(eval("@nl")?, "\\n");
    assert_eq!(eval("@nl()")?, "\\n");
    assert_eq!(eval(r#"@comment("this is a comment")"#)?, "");
    assert_eq!(
        eval("@set(value1,abc) @set(value2,def) @swap(value1,value2) @write(@get(value1),@get(value2))")?,
        "defabc"
    );
    Ok(())
}

#[test]
fn nested_scripts_share_state() -> Result<()> {
    assert_eq!(eval(r#"@exec("@set(value,23)") @write(@get(value))"#)?, "23");

    let mut engine = Engine::in_memory();
    run(&mut engine, r#"@set(script1,"@write(abc)")"#)?;
    assert_eq!(run(&mut engine, "@script(script1)")?, "abc");

    run(&mut engine, r#"@set(v1,"@get(v2)") @set(v2,123)"#)?;
    assert_eq!(run(&mut engine, "@get(v1)")?, "@get(v2)");
    assert_eq!(run(&mut engine, "@write(@getvalue(v1))")?, "123");
    Ok(())
}

#[test]
fn if_chains() -> Result<()> {
    let cases = [
        ("true", "abc"),
        ("false", "def"),
        ("null", "def"),
        ("true @or false", "abc"),
        ("true @and false", "def"),
        ("@not false", "abc"),
        ("@not @not false", "def"),
        ("false @or false @or true", "abc"),
        ("@eq(1,1) @and @not @eq(1,2)", "abc"),
    ];
    for (condition, expected) in cases {
        let script = format!("@if {condition} @then @write(abc) @else @write(def) @endif");
        assert_eq!(eval(&script)?, expected, "{script}");
    }
    Ok(())
}

#[test]
fn elseif_picks_first_true_branch() -> Result<()> {
    let script = "@if @eq(@get(n),1) @then @write(one) \
                  @elseif @eq(@get(n),2) @then @write(two) \
                  @elseif @eq(@get(n),2) @then @write(again) \
                  @else @write(many) @endif";
    for (n, expected) in [("1", "one"), ("2", "two"), ("3", "many")] {
        let mut engine = Engine::in_memory();
        run(&mut engine, &format!("@set(n,{n})"))?;
        assert_eq!(run(&mut engine, script)?, expected);
    }
    Ok(())
}

#[test]
fn skipped_branches_have_no_effects() -> Result<()> {
    let mut engine = Engine::in_memory();
    let output = run(
        &mut engine,
        "@if false @then @set(a,1) @if true @then @set(b,1) @endif @else @set(c,1) @endif",
    )?;
    assert_eq!(output, "");
    assert!(!engine.store().contains_key("a"));
    assert!(!engine.store().contains_key("b"));
    assert!(engine.store().contains_key("c"));
    Ok(())
}

#[test]
fn empty_branches() -> Result<()> {
    assert_eq!(eval("@if @eq(1,1) @then @endif")?, "");
    assert_eq!(eval("@if @eq(1,2) @then @write(abc) @else @endif")?, "");
    Ok(())
}

#[test]
fn condition_must_be_boolean() {
    assert_eq!(
        fails_with("@if maybe @then @write(x) @endif"),
        RuntimeErrorKind::NotBoolean("maybe".into())
    );
}

#[test]
fn broken_structure_is_reported() {
    assert_eq!(
        fails_with("@if true"),
        RuntimeErrorKind::StructuralImbalance(Imbalance::MissingThen)
    );
    assert_eq!(
        fails_with("@if true @write(x) @then @endif"),
        RuntimeErrorKind::UnexpectedToken("@write(".into())
    );
    assert_eq!(
        fails_with("@if false @then @write(x)"),
        RuntimeErrorKind::StructuralImbalance(Imbalance::MissingEndIf)
    );
    assert_eq!(
        fails_with("@for(i,1,2) @write($i)"),
        RuntimeErrorKind::StructuralImbalance(Imbalance::MissingEnd(dags::keyword::Keyword::EndFor))
    );
    assert_eq!(
        fails_with("@write(x"),
        RuntimeErrorKind::StructuralImbalance(Imbalance::UnclosedParenthesis)
    );
    assert_eq!(
        fails_with("@write(x))"),
        RuntimeErrorKind::StructuralImbalance(Imbalance::UnmatchedParenthesis)
    );
}

#[test]
fn unknown_names_are_not_found() {
    assert_eq!(
        fails_with("@blah(key)"),
        RuntimeErrorKind::TokenNotFound("@blah(".into())
    );
    assert_eq!(fails_with("@blah"), RuntimeErrorKind::TokenNotFound("@blah".into()));
}

#[test]
fn loops() -> Result<()> {
    assert_eq!(eval("@for(x,1,3) @write($x) @endfor")?, "123");
    assert_eq!(eval("@for(x,3,1) @write($x) @endfor")?, "");
    assert_eq!(
        eval("@for(y,1,2) @for(x,1,2) @write($y$x,\" \") @endfor @endfor")?,
        "11 12 21 22 "
    );
    // The outer loop substitutes first, so a reused name reads the outer value.
    assert_eq!(eval("@for(x,1,2) @for(x,5,6) @write($x) @endfor @endfor")?, "1122");

    let mut engine = Engine::in_memory();
    run(&mut engine, "@set(value.1,100) @set(value.2,200)")?;
    assert_eq!(
        run(&mut engine, r#"@foreachkey(x,"value.") @write($x) @endforeachkey"#)?,
        "12"
    );
    assert_eq!(
        run(&mut engine, r#"@foreachkey(x,"value.") @get(value.$x) @endforeachkey"#)?,
        "100200"
    );

    run(&mut engine, r#"@set(value,"10,20,30")"#)?;
    assert_eq!(
        run(&mut engine, "@foreachlist(x,value) @write($x) @endforeachlist")?,
        "102030"
    );
    Ok(())
}

#[test]
fn foreachkey_suffix_filters_and_trims() -> Result<()> {
    let mut engine = Engine::in_memory();
    run(
        &mut engine,
        "@set(item.a.name,Apple) @set(item.a.size,3) @set(item.b.name,Bean)",
    )?;
    let script = r#"@foreachkey(k,"item.",".name") @write($k,=,@get(item.$k.name),";") @endforeachkey"#;
    assert_eq!(run(&mut engine, script)?, "a=Apple;b=Bean;");
    Ok(())
}

#[test]
fn channels_are_fifo() -> Result<()> {
    let mut engine = Engine::in_memory();
    engine.in_channel_mut().push_back("abc".into());
    engine.in_channel_mut().push_back("123".into());
    assert_eq!(run(&mut engine, "@write(@getinchannel)")?, "abc");
    assert_eq!(run(&mut engine, "@write(@getinchannel())")?, "123");
    assert_eq!(run(&mut engine, "@write(@getinchannel)")?, "");

    assert_eq!(run(&mut engine, "@setoutchannel(abc) @setoutchannel(def)")?, "");
    assert_eq!(engine.out_channel_mut().pop_front().as_deref(), Some("abc"));
    assert_eq!(engine.out_channel_mut().pop_front().as_deref(), Some("def"));
    Ok(())
}

#[test]
fn random_values_stay_in_range() -> Result<()> {
    let mut engine = Engine::in_memory();
    run(&mut engine, "@set(value,@rnd(20))")?;
    let value: i64 = run(&mut engine, "@get(value)")?.parse()?;
    assert!((0..20).contains(&value));

    let hit = eval("@rand(30)")?;
    assert!(hit == "true" || hit == "false");
    Ok(())
}

#[test]
fn seeded_engines_repeat_themselves() -> Result<()> {
    let script = "@for(i,1,10) @write(@rnd(1000),\",\") @endfor";
    let mut first = Engine::with_options(Store::new(), Options::new().with_seed(42));
    let mut second = Engine::with_options(Store::new(), Options::new().with_seed(42));
    assert_eq!(run(&mut first, script)?, run(&mut second, script)?);
    Ok(())
}

#[test]
fn recursion_limit_stops_runaway_scripts() -> Result<()> {
    let mut engine = Engine::with_options(Store::new(), Options::new().with_max_depth(5));
    run(&mut engine, r#"@set(loop,"@script(loop)")"#)?;
    let error = engine
        .run_script("@script(loop)", &mut String::new())
        .expect_err("self reference never ends");
    assert_eq!(error.kind, RuntimeErrorKind::RecursionLimit(5));
    assert_eq!(error.scripts.last().map(String::as_str), Some("@script(loop)"));
    Ok(())
}

#[test]
fn output_before_a_failure_is_kept() {
    let mut engine = Engine::in_memory();
    let mut output = String::new();
    let result = engine.run_script("@write(abc) @set(kept,1) @write(@div(1,0))", &mut output);
    assert!(result.is_err());
    assert_eq!(output, "abc");
    assert!(engine.store().contains_key("kept"));
}

#[test]
fn wrong_arity_is_reported() {
    assert_eq!(
        fails_with("@add(1)"),
        RuntimeErrorKind::ParamCountMismatch {
            token: "@add(".into(),
            expected: dags::keyword::Keyword::Add.arity(),
            found: 1,
        }
    );
}
