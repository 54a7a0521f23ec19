use runlog_submit::{
    CodeWrapper, Position, SelectionRange, SubmitParams, WrapperPair, selected_text,
};

#[test]
fn test_selection_extraction_then_wrapping() {
    let document = "proc sql;\n  select * from t;\nquit;\n\ndata out;\n  set in;\nrun;";
    let selections = [
        SelectionRange::new(Position::new(0, 0), Position::new(2, 5)),
        SelectionRange::new(Position::new(4, 0), Position::new(6, 4)),
    ];

    let code = selected_text(document, &selections);
    assert_eq!(
        code,
        "proc sql;\n  select * from t;\nquit;\ndata out;\n  set in;\nrun;"
    );

    let params = SubmitParams {
        preamble: Some("options nonotes;".to_string()),
        postamble: Some("options notes;".to_string()),
        ..SubmitParams::default()
    };
    let wrapped = params.wrap(&code);
    let lines: Vec<&str> = wrapped.split('\n').collect();
    assert_eq!(lines.first(), Some(&"options nonotes;"));
    assert_eq!(lines.get(1), Some(&"proc sql;"));
    assert_eq!(lines.last(), Some(&"options notes;"));
    assert_eq!(lines.len(), 8);
}

#[test]
fn test_submit_params_serde_round_trip() {
    let params = SubmitParams {
        program_name_line: Some("%program 'a.lang';".to_string()),
        preamble: None,
        postamble: Some("quit;".to_string()),
        output_wrapper: Some(WrapperPair {
            prefix: "output open;".to_string(),
            suffix: "output close;".to_string(),
        }),
        language_wrapper: None,
    };

    let json = serde_json::to_string(&params).expect("serialize");
    let back: SubmitParams = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, params);
}

#[test]
fn test_submit_params_deserializes_partial_profile() {
    let json = r#"{ "preamble": "options linesize=max;" }"#;
    let params: SubmitParams = serde_json::from_str(json).expect("deserialize");
    assert_eq!(params.preamble.as_deref(), Some("options linesize=max;"));
    assert!(params.program_name_line.is_none());
    assert!(params.output_wrapper.is_none());
}
