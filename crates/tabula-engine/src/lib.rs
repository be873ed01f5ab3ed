//! tabula_engine - Spreadsheet engine: cells, dependency graph, formulas.

pub mod engine;

#[cfg(test)]
mod tests {
    use crate::engine::*;

    fn pos(label: &str) -> Position {
        Position::from_str(label).unwrap()
    }

    fn value(sheet: &Sheet, label: &str) -> Value {
        sheet.cell_at(pos(label)).unwrap().unwrap().value()
    }

    #[test]
    fn test_from_str_single_letter_columns() {
        assert_eq!(pos("A1"), Position::new(0, 0));
        assert_eq!(pos("B1"), Position::new(0, 1));
        assert_eq!(pos("Z1"), Position::new(0, 25));
    }

    #[test]
    fn test_from_str_multi_letter_columns() {
        assert_eq!(pos("AA1").col, 26);
        assert_eq!(pos("AB1").col, 27);
        assert_eq!(pos("AZ1").col, 51);
        assert_eq!(pos("BA1").col, 52);
    }

    #[test]
    fn test_from_str_row_numbers() {
        assert_eq!(pos("A1").row, 0);
        assert_eq!(pos("A10").row, 9);
        assert_eq!(pos("A100").row, 99);
    }

    #[test]
    fn test_from_str_invalid_inputs() {
        assert!(Position::from_str("").is_none());
        assert!(Position::from_str("123").is_none());
        assert!(Position::from_str("ABC").is_none());
        assert!(Position::from_str("A0").is_none());
        assert!(Position::from_str("1A").is_none());
        assert!(Position::from_str("A 1").is_none());
        assert!(Position::from_str("a1").is_none());
    }

    #[test]
    fn test_to_string_round_trip() {
        for label in ["A1", "Z9", "AA10", "AZ100", "XFD16384"] {
            assert_eq!(pos(label).to_string(), label);
        }
    }

    #[test]
    fn test_sum_of_column() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "10").unwrap();
        sheet.set_cell(pos("A2"), "20").unwrap();
        sheet.set_cell(pos("A3"), "30").unwrap();
        sheet.set_cell(pos("A4"), "=A1 + A2 + A3").unwrap();
        assert_eq!(value(&sheet, "A4"), Value::Number(60.0));
        assert_eq!(sheet.cell_at(pos("A4")).unwrap().unwrap().text(), "=A1+A2+A3");
    }

    #[test]
    fn test_diamond_dependencies() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "2").unwrap();
        sheet.set_cell(pos("B1"), "=A1*3").unwrap();
        sheet.set_cell(pos("C1"), "=A1+4").unwrap();
        sheet.set_cell(pos("D1"), "=B1+C1").unwrap();
        assert_eq!(value(&sheet, "D1"), Value::Number(12.0));

        sheet.set_cell(pos("A1"), "5").unwrap();
        assert_eq!(value(&sheet, "D1"), Value::Number(24.0));
        assert_eq!(
            sheet.cell_at(pos("A1")).unwrap().unwrap().dependents(),
            vec![pos("B1"), pos("C1")]
        );
    }

    #[test]
    fn test_detect_cycle_self_reference() {
        let mut sheet = Sheet::new();
        let err = sheet.set_cell(pos("A1"), "=A1+1").unwrap_err();
        assert!(matches!(err, SheetError::CircularDependency { .. }));
    }

    #[test]
    fn test_detect_cycle_indirect() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "=B1").unwrap();
        sheet.set_cell(pos("B1"), "=C1").unwrap();
        let err = sheet.set_cell(pos("C1"), "=A1").unwrap_err();
        let SheetError::CircularDependency { path, .. } = err else {
            panic!("Expected circular dependency");
        };
        assert_eq!(path, vec![pos("C1"), pos("A1"), pos("B1"), pos("C1")]);
    }

    #[test]
    fn test_detect_cycle_no_cycle() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "10").unwrap();
        sheet.set_cell(pos("B1"), "20").unwrap();
        sheet.set_cell(pos("C1"), "=A1 + B1").unwrap();
        sheet.set_cell(pos("D1"), "=C1 + A1").unwrap();
        assert_eq!(value(&sheet, "D1"), Value::Number(40.0));
    }

    #[test]
    fn test_find_cycle_on_sheet_directory() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("B1"), "=A1").unwrap();
        assert!(find_cycle(&sheet, pos("A1"), &[pos("B1")]).is_some());
        assert!(find_cycle(&sheet, pos("A1"), &[pos("C1")]).is_none());
        assert!(find_cycle(&sheet, pos("C1"), &[pos("A1"), pos("B1")]).is_none());
    }

    #[test]
    fn test_error_values_do_not_block_mutation() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "=1/0").unwrap();
        sheet.set_cell(pos("B1"), "=A1+1").unwrap();
        assert_eq!(value(&sheet, "B1"), Value::Error(FormulaError::Arithmetic));
        sheet.set_cell(pos("A1"), "1").unwrap();
        assert_eq!(value(&sheet, "B1"), Value::Number(2.0));
    }
}
