//! Tests for block resolution

#[cfg(test)]
mod resolve_tests {
    use crate::block::{BlockKind, ResolvedBlock, Terminator};
    use crate::error::StructuralError;
    use crate::lexer::Keyword;
    use crate::resolve::{resolve, resolve_with_excerpt, ScanState};

    fn block(start: usize, end: usize, declared: Option<&str>, suggested: Option<&str>) -> ResolvedBlock {
        ResolvedBlock {
            start_line: start,
            end_line: end,
            declared_name: declared.map(str::to_string),
            suggested_name: suggested.map(str::to_string),
        }
    }

    #[test]
    fn test_plain_named_function() {
        let src = "function foo()\n    print(\"end\")\nend";
        let blocks = resolve(src).unwrap();
        assert_eq!(blocks, vec![block(1, 3, Some("foo"), Some("foo"))]);
    }

    #[test]
    fn test_method_and_field_declarations() {
        let src = r#"
function M:bar(x)
  return x
end

function M.util.baz()
end
"#;
        let blocks = resolve(src).unwrap();
        assert_eq!(
            blocks,
            vec![
                block(2, 4, Some("M:bar"), Some("M:bar")),
                block(6, 7, Some("M.util.baz"), Some("M.util.baz")),
            ]
        );
    }

    #[test]
    fn test_local_function_declaration() {
        let blocks = resolve("local function helper(a)\n  return a\nend").unwrap();
        assert_eq!(blocks, vec![block(1, 3, Some("helper"), Some("helper"))]);
    }

    #[test]
    fn test_assignment_is_anonymous_with_suggested_name() {
        let blocks = resolve("local x = function() end").unwrap();
        assert_eq!(blocks, vec![block(1, 1, None, Some("x"))]);
    }

    #[test]
    fn test_qualified_assignment() {
        let src = "M.handlers.on_click = function(evt)\n  return evt\nend";
        let blocks = resolve(src).unwrap();
        assert_eq!(blocks, vec![block(1, 3, None, Some("M.handlers.on_click"))]);
    }

    #[test]
    fn test_nested_functions_emit_inner_first() {
        let src = r#"function outer()
  local function inner()
    return 1
  end
  return inner()
end"#;
        let blocks = resolve(src).unwrap();
        assert_eq!(
            blocks,
            vec![
                block(2, 4, Some("inner"), Some("inner")),
                block(1, 6, Some("outer"), Some("outer")),
            ]
        );
    }

    #[test]
    fn test_sibling_functions_keep_source_order() {
        let src = "function a()\nend\nfunction b()\nend\nfunction c()\nend";
        let names: Vec<String> = resolve(src)
            .unwrap()
            .into_iter()
            .filter_map(|b| b.declared_name)
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_for_do_is_a_single_block() {
        assert_eq!(resolve("for i=1,10 do end").unwrap(), vec![]);
    }

    #[test]
    fn test_while_do_and_generic_for() {
        let src = r#"function loop(t)
  while t.busy do
    t:step()
  end
  for k, v in pairs(t) do
    print(k, v)
  end
end"#;
        assert_eq!(resolve(src).unwrap(), vec![block(1, 8, Some("loop"), Some("loop"))]);
    }

    #[test]
    fn test_do_on_following_line_still_continues_loop() {
        let src = "for i = 1, 3\ndo\n  print(i)\nend";
        assert_eq!(resolve(src).unwrap(), vec![]);
    }

    #[test]
    fn test_standalone_do_block() {
        let src = "function f()\n  do\n    local x = 1\n  end\nend";
        assert_eq!(resolve(src).unwrap(), vec![block(1, 5, Some("f"), Some("f"))]);
    }

    #[test]
    fn test_do_block_directly_after_loop_header() {
        let src = "while busy do do\n  step()\nend end";
        assert_eq!(resolve(src).unwrap(), vec![]);
    }

    #[test]
    fn test_repeat_until() {
        let src = "function f()\n  repeat\n    x = x + 1\n  until x > 10\nend";
        assert_eq!(resolve(src).unwrap(), vec![block(1, 5, Some("f"), Some("f"))]);
    }

    #[test]
    fn test_repeat_closed_by_end_is_mismatch() {
        let err = resolve("repeat\n  x = x + 1\nend").unwrap_err();
        assert_eq!(
            err,
            StructuralError::MismatchedBlock {
                opener_kind: BlockKind::Repeat,
                opener_line: 1,
                found_terminator: Terminator::End,
                line: 3,
            }
        );
    }

    #[test]
    fn test_function_closed_by_until_is_mismatch() {
        let err = resolve("function f()\nuntil done").unwrap_err();
        assert!(matches!(
            err,
            StructuralError::MismatchedBlock {
                opener_kind: BlockKind::Function,
                found_terminator: Terminator::Until,
                ..
            }
        ));
    }

    #[test]
    fn test_unmatched_terminator() {
        let err = resolve("x = 1\nend").unwrap_err();
        assert_eq!(
            err,
            StructuralError::UnmatchedTerminator {
                token: Terminator::End,
                line: 2,
            }
        );
    }

    #[test]
    fn test_unmatched_until_on_empty_stack() {
        let err = resolve("until x").unwrap_err();
        assert_eq!(
            err,
            StructuralError::UnmatchedTerminator {
                token: Terminator::Until,
                line: 1,
            }
        );
        assert_eq!(err.to_string(), "unmatched `until` at line 1");
    }

    #[test]
    fn test_until_after_closed_repeat_is_unmatched() {
        let err = resolve("repeat\n  x()\nuntil done\nuntil again").unwrap_err();
        assert_eq!(
            err,
            StructuralError::UnmatchedTerminator {
                token: Terminator::Until,
                line: 4,
            }
        );
    }

    #[test]
    fn test_unclosed_reports_innermost_with_excerpt() {
        let src = "function f()\n  if x then\n    y()\n  z()\n  w()";
        let err = resolve(src).unwrap_err();
        match err {
            StructuralError::UnclosedBlock {
                opener_kind,
                opener_line,
                excerpt,
            } => {
                assert_eq!(opener_kind, BlockKind::If);
                assert_eq!(opener_line, 2);
                let numbers: Vec<usize> = excerpt.iter().map(|l| l.line).collect();
                assert_eq!(numbers, vec![2, 3, 4, 5]);
                assert_eq!(excerpt[0].text, "  if x then");
            }
            other => panic!("expected UnclosedBlock, got {:?}", other),
        }
    }

    #[test]
    fn test_excerpt_length_is_configurable() {
        let err = resolve_with_excerpt("function f()\n  a()\n  b()\n  c()", 2).unwrap_err();
        assert_eq!(err.excerpt().len(), 2);
        assert_eq!(err.excerpt()[1].text, "  a()");
    }

    #[test]
    fn test_excerpt_stops_at_end_of_input() {
        let err = resolve("x()\nfunction f()").unwrap_err();
        assert_eq!(err.excerpt().len(), 1);
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn test_keywords_inside_strings_are_ignored() {
        assert_eq!(resolve("local s = \"end of function\"").unwrap(), vec![]);
        assert_eq!(resolve("print('repeat', \"until\", 'do end')").unwrap(), vec![]);
    }

    #[test]
    fn test_one_line_function_with_nested_if() {
        let blocks = resolve("function M.f() if a then b() end end").unwrap();
        assert_eq!(blocks, vec![block(1, 1, Some("M.f"), Some("M.f"))]);
    }

    #[test]
    fn test_assignment_with_trailing_blocks_on_same_line() {
        let src = "local g = function(x) if x then return 1 end\n  return 0\nend";
        assert_eq!(resolve(src).unwrap(), vec![block(1, 3, None, Some("g"))]);
    }

    #[test]
    fn test_callback_argument_is_anonymous() {
        let src = "table.sort(t, function(a, b) return a < b end)";
        assert_eq!(resolve(src).unwrap(), vec![block(1, 1, None, None)]);
    }

    #[test]
    fn test_returned_function_is_anonymous() {
        let src = "return function()\n  return 1\nend";
        assert_eq!(resolve(src).unwrap(), vec![block(1, 3, None, None)]);
    }

    #[test]
    fn test_equality_is_not_assignment() {
        let src = "if cb == function_table then\nend";
        assert_eq!(resolve(src).unwrap(), vec![]);
    }

    #[test]
    fn test_elseif_is_not_an_opener() {
        let src = r#"function classify(n)
  if n < 0 then
    return "neg"
  elseif n == 0 then
    return "zero"
  else
    return "pos"
  end
end"#;
        assert_eq!(
            resolve(src).unwrap(),
            vec![block(1, 9, Some("classify"), Some("classify"))]
        );
    }

    #[test]
    fn test_scan_state_tracks_last_keyword_across_lines() {
        let mut state = ScanState::new();
        state.scan_line(1, "function f()").unwrap();
        assert_eq!(state.depth(), 1);
        state.scan_line(2, "  for i = 1, n").unwrap();
        assert_eq!(state.last_keyword(), Some(Keyword::For));
        state.scan_line(3, "  do").unwrap();
        assert_eq!(state.depth(), 2, "`do` after `for` must not open a block");
        state.scan_line(4, "  end").unwrap();
        state.scan_line(5, "end").unwrap();
        assert_eq!(state.depth(), 0);
        assert_eq!(state.blocks().len(), 1);
        let blocks = state.finish(&[], 4).unwrap();
        assert_eq!(blocks, vec![block(1, 5, Some("f"), Some("f"))]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(resolve("").unwrap(), vec![]);
    }
}
