//! End-to-end parsing scenarios.

use approx::assert_relative_eq;
use cdl_parser::model::{AttributeValue, DimensionSize, FILL_INT};
use cdl_parser::{parse, parse_with_options, CdlError, DiagnosticKind, NcType, ParseOptions, Value};

const SAMPLE: &str = r#"netcdf sample {
dimensions:
    lev = 1 ;
    lat = 2 ;
    lon = 3 ;
variables:
    int tas(lev, lat, lon) ;
        tas:standard_name = "air_temperature" ;
        tas:units = "K" ;
    float height(lev) ;
        height:units = "m" ;
// global attributes
    :comment = "sample dataset" ;
data:
    tas = 0, 1, 2, 3, 4, 5 ;
    height = 10.0f ;
}"#;

fn errors_of(err: &CdlError) -> Vec<DiagnosticKind> {
    err.diagnostics()
        .iter()
        .filter(|d| d.is_error())
        .map(|d| d.kind)
        .collect()
}

#[test]
fn test_sample_dataset() {
    let output = parse(SAMPLE).unwrap();
    assert!(output.warnings().is_empty());

    let ds = &output.dataset;
    assert_eq!(ds.name, "sample");
    let dims: Vec<_> = ds.dimensions.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(dims, vec!["lev", "lat", "lon"]);
    let vars: Vec<_> = ds.variables.keys().map(String::as_str).collect();
    assert_eq!(vars, vec!["tas", "height"]);
    assert_eq!(ds.attributes.len(), 1);
    assert_eq!(ds.variable_attribute_count(), 3);

    assert_eq!(ds.data.len(), 2);
    assert_eq!(ds.data_for("tas").unwrap().len(), 6);
    assert_eq!(ds.data_for("height").unwrap().values, vec![Value::Float(10.0)]);

    let tas = ds.variable("tas").unwrap();
    assert_eq!(tas.nc_type, NcType::Int);
    assert_eq!(ds.shape(tas), vec![1, 2, 3]);
    assert_eq!(ds.capacity(tas), Some(6));
    assert_eq!(
        tas.attribute("units").unwrap().value.as_text(),
        Some("K")
    );
}

#[test]
fn test_ghost_attribute_target() {
    let input = SAMPLE.replace(
        "    :comment",
        "    ghost:units = \"m\" ;\n    :comment",
    );
    let err = parse(&input).unwrap_err();
    assert_eq!(errors_of(&err), vec![DiagnosticKind::UnresolvedReference]);
    let diagnostic = &err.diagnostics()[0];
    assert!(diagnostic.message.contains("ghost"));
    assert_eq!(diagnostic.position.line, 13);
}

#[test]
fn test_capacity_exceeded() {
    let input = SAMPLE.replace("tas = 0, 1, 2, 3, 4, 5 ;", "tas = 0, 1, 2, 3, 4, 5, 6 ;");
    let err = parse(&input).unwrap_err();
    assert_eq!(errors_of(&err), vec![DiagnosticKind::CapacityExceeded]);

    // The same input as a tree plus lenient validation keeps the first six values
    let mut diagnostics = cdl_parser::Diagnostics::new(&ParseOptions::default());
    let ast = cdl_parser::cdl::parse_tree(&input, &mut diagnostics);
    let build = cdl_parser::model::build(&ast, &ParseOptions::default(), &mut diagnostics);
    let dataset = cdl_parser::model::validate(build, &mut diagnostics);
    let values: Vec<_> = dataset
        .data_for("tas")
        .unwrap()
        .values
        .iter()
        .map(|v| v.as_i64().unwrap())
        .collect();
    assert_eq!(values, vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn test_duplicate_dimension() {
    let input = SAMPLE.replace("    lon = 3 ;", "    lon = 3 ;\n    lat = 5 ;");
    let err = parse(&input).unwrap_err();
    assert_eq!(errors_of(&err), vec![DiagnosticKind::DuplicateDefinition]);

    let mut diagnostics = cdl_parser::Diagnostics::new(&ParseOptions::default());
    let ast = cdl_parser::cdl::parse_tree(&input, &mut diagnostics);
    let build = cdl_parser::model::build(&ast, &ParseOptions::default(), &mut diagnostics);
    assert_eq!(build.dataset.dimensions.len(), 3);
    assert_eq!(
        build.dataset.dimension("lat").unwrap().size,
        DimensionSize::Fixed(2)
    );
}

#[test]
fn test_declaration_order_is_irrelevant() {
    let input = r#"netcdf order {
variables:
    float t(time) ;
        t:units = "s" ;
dimensions:
    time = 4 ;
}"#;
    let output = parse(input).unwrap();
    let t = output.dataset.variable("t").unwrap();
    assert_eq!(output.dataset.capacity(t), Some(4));
}

#[test]
fn test_syntax_errors_are_all_reported() {
    let input = r#"netcdf broken {
dimensions:
    a = 2 ;
    b = = 3 ;
variables:
    int v(a) ;
    float w(a ;
    int x(a) ;
data:
    v = 1, 2 ;
}"#;
    let err = parse(input).unwrap_err();
    let syntax: Vec<_> = err
        .diagnostics()
        .iter()
        .filter(|d| d.kind == DiagnosticKind::Syntax)
        .collect();
    assert_eq!(syntax.len(), 2);
    assert_eq!(syntax[0].position.line, 4);
    assert_eq!(syntax[1].position.line, 7);
    assert!(syntax.iter().all(|d| d.recovery.is_some()));
}

#[test]
fn test_constants() {
    let input = r#"netcdf constants {
dimensions:
    dim1 = 3 ;
variables:
    float var1(dim1) ;
        var1:att1 = "dummy attribute" ;
// global attributes
    :c1 = "foo" ;      // with spaces
    :c2="bar" ;        // w/o spaces
    :byte1 = 123b ;
    :byte2 = 'a' ;
    :byte3 = '\n' ;
    :short1 = 1234s ;
    :short2 = -888s ;
    :short3 = 0xFFs ;
    :short4 = 077s ;
    :int1 = -56789 ;
    :int2 = 123456 ;
    :int3 = 0666 ;
    :int4 = 0x2F ;
    :iarray = 1, 2, 3, 4 ;
    :float1 = 123.0f ;
    :float2 = 0.2718e1f ;
    :double1 = 3.14159d ;
    :double2 = 0.010203 ;
data:
    var1 = 1.0f, 2.0f, _ ;
}"#;
    let output = parse(input).unwrap();
    let ds = &output.dataset;
    let single = |name: &str| match &ds.attribute(name).unwrap().value {
        AttributeValue::Values(values) => values[0],
        other => panic!("{} is not numeric: {:?}", name, other),
    };

    assert_eq!(ds.attribute("c1").unwrap().value.as_text(), Some("foo"));
    assert_eq!(ds.attribute("c2").unwrap().value.as_text(), Some("bar"));
    assert_eq!(single("byte1"), Value::Byte(123));
    assert_eq!(single("byte2"), Value::Byte(97));
    assert_eq!(single("byte3"), Value::Byte(10));
    assert_eq!(single("short1"), Value::Short(1234));
    assert_eq!(single("short2"), Value::Short(-888));
    assert_eq!(single("short3"), Value::Short(255));
    assert_eq!(single("short4"), Value::Short(63));
    assert_eq!(single("int1"), Value::Int(-56789));
    assert_eq!(single("int2"), Value::Int(123456));
    assert_eq!(single("int3"), Value::Int(438));
    assert_eq!(single("int4"), Value::Int(47));
    assert_eq!(
        ds.attribute("iarray").unwrap().value.as_values().unwrap(),
        &[Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]
    );
    assert_eq!(single("float1"), Value::Float(123.0));
    assert_relative_eq!(single("float2").as_f64(), 2.718, epsilon = 1e-6);
    assert_eq!(single("float2").nc_type(), NcType::Float);
    assert_eq!(single("double1"), Value::Double(3.14159));
    assert_eq!(single("double2"), Value::Double(0.010203));

    let data = &ds.data_for("var1").unwrap().values;
    assert_eq!(data[..2], [Value::Float(1.0), Value::Float(2.0)]);
    assert_eq!(data[2], Value::Float(cdl_parser::model::FILL_FLOAT));
}

#[test]
fn test_fill_values_and_record_dimension() {
    let input = r#"netcdf fillvalues {
dimensions:
    lat = 2 ;
    lon = 2 ;
    time = unlimited ;
variables:
    int time(time) ;
        time:units = "days since 1970-01-01" ;
    float tas(time, lat, lon) ;
        tas:_FillValue = -1.0e30f ;
data:
    time = 0, 30, 60 ;
    tas = _, _, 3.0f, 4.0f, 5.0f, 6.0f, 7.0f, 8.0f, 9.0f, 10.0f ;
}"#;
    let output = parse(input).unwrap();
    let ds = &output.dataset;
    assert_eq!(ds.unlimited_dimension().unwrap().name, "time");
    assert_eq!(ds.record_count(), 3);

    let tas = ds.variable("tas").unwrap();
    assert_eq!(ds.capacity(tas), None);
    assert_eq!(ds.shape(tas), vec![3, 2, 2]);
    assert_eq!(tas.fill_value(), Value::Float(-1.0e30));

    let padded = ds.padded_data("tas").unwrap();
    assert_eq!(padded.len(), 12);
    assert_eq!(padded[0], Value::Float(-1.0e30));
    assert_eq!(padded[2], Value::Float(3.0));
    assert_eq!(padded[9], Value::Float(10.0));
    assert_eq!(padded[11], Value::Float(-1.0e30));

    let time = ds.padded_data("time").unwrap();
    assert_eq!(time, vec![Value::Int(0), Value::Int(30), Value::Int(60)]);
}

#[test]
fn test_default_fill_for_missing_data() {
    let input = "netcdf f { dimensions: n = 3 ; variables: int v(n) ; data: v = 1 ; }";
    let output = parse(input).unwrap();
    assert_eq!(
        output.dataset.padded_data("v").unwrap(),
        vec![Value::Int(1), Value::Int(FILL_INT), Value::Int(FILL_INT)]
    );
}

#[test]
fn test_char_variables() {
    let input = r#"netcdf charvars {
dimensions:
    nreg = 3 ;
    namelen = 10 ;
    rec = 2 ;
    code = 3 ;
    codelen = 4 ;
variables:
    char letter ;
    char regions(nreg, namelen) ;
        regions:long_name = "region names" ;
    char digits(namelen) ;
    char dna_code(rec, code, codelen) ;
data:
    regions = "Europe", "Americas", "Asia" ;
    digits = "0123456789" ;
    letter = "X" ;
    dna_code = "ACTG", "ACGG", "ATGC", "CTGA", "GCTA", "TGCA";
}"#;
    let output = parse(input).unwrap();
    let ds = &output.dataset;
    let text = |name: &str| -> Vec<u8> {
        ds.data_for(name)
            .unwrap()
            .values
            .iter()
            .map(|v| match v {
                Value::Char(c) => *c,
                other => panic!("not a char: {:?}", other),
            })
            .collect()
    };

    assert_eq!(text("letter"), b"X");
    assert_eq!(text("digits"), b"0123456789");

    let regions = text("regions");
    assert_eq!(regions.len(), 30);
    assert!(regions[..10].starts_with(b"Europe\0"));
    assert!(regions[10..20].starts_with(b"Americas\0"));
    assert!(regions[20..].starts_with(b"Asia\0"));

    let dna = text("dna_code");
    assert_eq!(dna.len(), 24);
    assert_eq!(&dna[12..16], b"CTGA");
    assert_eq!(ds.shape(ds.variable("dna_code").unwrap()), vec![2, 3, 4]);
}

#[test]
fn test_strict_mode_promotes_warnings() {
    let input = "netcdf s { dimensions: n = 1 ; variables: short v(n) ; data: v = 2.5 ; }";
    let lenient = parse(input).unwrap();
    assert_eq!(lenient.warnings().len(), 1);
    assert_eq!(lenient.dataset.data_for("v").unwrap().values, vec![Value::Short(2)]);

    let err = parse_with_options(input, ParseOptions::strict()).unwrap_err();
    assert_eq!(errors_of(&err), vec![DiagnosticKind::TypeMismatch]);
}

#[test]
fn test_unlimited_dimension_can_be_disallowed() {
    let input = "netcdf u { dimensions: t = UNLIMITED ; variables: int v(t) ; }";
    assert!(parse(input).is_ok());
    let options = ParseOptions::default().with_unlimited_dimension(false);
    let err = parse_with_options(input, options).unwrap_err();
    assert_eq!(errors_of(&err), vec![DiagnosticKind::InvalidDimension]);
}

#[test]
fn test_error_limit_stops_before_validation() {
    let mut input = String::from("netcdf many {\nvariables:\n    byte b ;\ndata:\n    b = 300 ;\n");
    for i in 0..20 {
        input.push_str(&format!("    missing{} = 1 ;\n", i));
    }
    input.push('}');
    let err = parse_with_options(&input, ParseOptions::default().with_max_errors(5)).unwrap_err();
    let diagnostics = err.diagnostics();
    assert_eq!(diagnostics.last().unwrap().kind, DiagnosticKind::ErrorLimit);
    // five recorded errors plus the final limit diagnostic
    assert_eq!(errors_of(&err).len(), 6);
    assert!(diagnostics.iter().all(|d| d.kind != DiagnosticKind::Overflow));
}

#[test]
fn test_error_limit_caps_errors_within_one_stage() {
    let mut input = String::from("netcdf zeros {\ndimensions:\n");
    for i in 0..6 {
        input.push_str(&format!("    x{} = 0 ;\n", i));
    }
    input.push('}');
    let err = parse_with_options(&input, ParseOptions::default().with_max_errors(2)).unwrap_err();
    assert_eq!(
        errors_of(&err),
        vec![
            DiagnosticKind::InvalidDimension,
            DiagnosticKind::InvalidDimension,
            DiagnosticKind::ErrorLimit
        ]
    );
}

#[test]
fn test_huge_dimensions_are_diagnosed() {
    let input = r#"netcdf huge {
dimensions:
    a = 2000000000, b = 2000000000, c = 2000000000, d = 3000000000 ;
variables:
    int v(a, b, c) ;
data:
    v = 1 ;
}"#;
    let err = parse(input).unwrap_err();
    assert_eq!(
        errors_of(&err),
        vec![DiagnosticKind::InvalidDimension, DiagnosticKind::InvalidDimension]
    );
    let diagnostics = err.diagnostics();
    assert!(diagnostics[0].message.contains("'d'"));
    assert_eq!(diagnostics[1].position.line, 5);
}

#[test]
fn test_diagnostics_sorted_by_position() {
    let input = r#"netcdf sorted {
dimensions:
    n = 2 ;
    n = 3 ;
variables:
    int v(m) ;
data:
    w = 1 ;
}"#;
    let err = parse(input).unwrap_err();
    let positions: Vec<_> = err.diagnostics().iter().map(|d| d.position).collect();
    let mut sorted = positions.clone();
    sorted.sort();
    assert_eq!(positions, sorted);
    assert_eq!(err.diagnostics().len(), 3);
}

#[test]
fn test_display_output_reparses() {
    let output = parse(SAMPLE).unwrap();
    let text = output.dataset.to_string();
    assert!(text.starts_with("netcdf sample {\ndimensions:\n\tlev = 1 ;"));
    let reparsed = parse(&text).unwrap();
    assert_eq!(reparsed.dataset, output.dataset);
}
