//! Unit tests for mapd-io.

// ── Map parsing ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod map {
    use crate::{IoError, parse_map};
    use mapd_core::Cell;

    const SMALL_MAP: &str = "\
type octile
height 3
width 4
map
.@..
..T.
....
";

    #[test]
    fn parses_dimensions_and_obstacles() {
        let grid = parse_map(SMALL_MAP).unwrap();
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.width(), 4);
        assert!(grid.is_free(Cell::new(0, 0)));
        assert!(!grid.is_free(Cell::new(0, 1))); // @
        assert!(!grid.is_free(Cell::new(1, 2))); // T
        assert!(grid.is_free(Cell::new(2, 3)));
    }

    #[test]
    fn goal_and_swamp_chars_are_traversable() {
        let input = "height 1\nwidth 3\nmap\n.GS\n";
        let grid = parse_map(input).unwrap();
        assert!(grid.is_free(Cell::new(0, 1)));
        assert!(grid.is_free(Cell::new(0, 2)));
    }

    #[test]
    fn trailing_lines_ignored() {
        let input = format!("{SMALL_MAP}\nextra trailing junk\n");
        assert!(parse_map(&input).is_ok());
    }

    #[test]
    fn missing_header_rejected() {
        let err = parse_map("height 2\nmap\n..\n..\n");
        assert!(matches!(err, Err(IoError::MissingHeader("width"))));
    }

    #[test]
    fn bad_header_value_rejected() {
        let err = parse_map("height abc\nwidth 2\nmap\n..\n");
        assert!(matches!(err, Err(IoError::InvalidHeader { field: "height", .. })));
    }

    #[test]
    fn short_row_rejected() {
        let err = parse_map("height 2\nwidth 3\nmap\n...\n..\n");
        assert!(matches!(
            err,
            Err(IoError::RowWidthMismatch { row: 1, expected: 3, got: 2 })
        ));
    }

    #[test]
    fn missing_rows_rejected() {
        let err = parse_map("height 3\nwidth 2\nmap\n..\n..\n");
        assert!(matches!(err, Err(IoError::RowCountMismatch { expected: 3, got: 2 })));
    }
}

// ── Scenario parsing ──────────────────────────────────────────────────────────

#[cfg(test)]
mod scenario {
    use crate::{IoError, parse_scenario};
    use mapd_core::Cell;

    const SCEN: &str = "\
version 1
0\trandom-32-32-10.map\t32\t32\t4\t14\t10\t25\t19.4
1\trandom-32-32-10.map\t32\t32\t0\t1\t2\t3\t4.0
2\trandom-32-32-10.map\t32\t32\t30\t7\t6\t22\t40.2
";

    /// File order is x-then-y; cells are (y, x).
    #[test]
    fn coordinates_flip_to_row_major() {
        let (starts, goals) = parse_scenario(SCEN, 2).unwrap();
        assert_eq!(starts, vec![Cell::new(14, 4), Cell::new(1, 0)]);
        assert_eq!(goals, vec![Cell::new(25, 10), Cell::new(3, 2)]);
    }

    #[test]
    fn header_and_junk_lines_skipped() {
        let noisy = format!("junk line\n\n{SCEN}");
        let (starts, _) = parse_scenario(&noisy, 3).unwrap();
        assert_eq!(starts.len(), 3);
        assert_eq!(starts[2], Cell::new(7, 30));
    }

    #[test]
    fn too_few_entries_rejected() {
        let err = parse_scenario(SCEN, 5);
        assert!(matches!(err, Err(IoError::NotEnoughEntries { requested: 5, got: 3 })));
    }

    #[test]
    fn space_separated_fields_accepted() {
        let input = "0 some.map 8 8 1 2 3 4 5.0\n";
        let (starts, goals) = parse_scenario(input, 1).unwrap();
        assert_eq!(starts, vec![Cell::new(2, 1)]);
        assert_eq!(goals, vec![Cell::new(4, 3)]);
    }
}

// ── Plan output ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod plan {
    use crate::write_plan;
    use mapd_core::{Cell, Configuration};

    /// Golden format: x before y, trailing comma, one line per timestep.
    #[test]
    fn visualizer_line_format() {
        let plan: Vec<Configuration> = vec![
            vec![Cell::new(0, 0), Cell::new(2, 4)],
            vec![Cell::new(0, 1), Cell::new(1, 4)],
        ];
        let mut out: Vec<u8> = Vec::new();
        write_plan(&mut out, &plan).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "0:(0,0),(4,2),\n1:(1,0),(4,1),\n"
        );
    }

    #[test]
    fn empty_plan_writes_nothing() {
        let mut out: Vec<u8> = Vec::new();
        write_plan(&mut out, &[]).unwrap();
        assert!(out.is_empty());
    }
}

// ── Task log ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod task_log {
    use crate::{save_task_log, write_task_log};
    use mapd_core::{AgentId, Cell, TaskId};
    use mapd_dispatch::Task;

    fn sample_tasks() -> Vec<Task> {
        vec![
            Task {
                task_id: TaskId(0),
                pickup: Cell::new(1, 0),
                delivery: Cell::new(5, 19),
                created_at: 3,
                assigned_to: Some(AgentId(2)),
                picked_up_at: Some(10),
                delivered_at: Some(31),
            },
            Task {
                task_id: TaskId(1),
                pickup: Cell::new(9, 0),
                delivery: Cell::new(13, 19),
                created_at: 4,
                assigned_to: None,
                picked_up_at: None,
                delivered_at: None,
            },
        ]
    }

    #[test]
    fn csv_rows_and_header() {
        let mut out: Vec<u8> = Vec::new();
        write_task_log(&mut out, &sample_tasks()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "task_id,pickup_y,pickup_x,delivery_y,delivery_x,created_at,assigned_to,picked_up_at,delivered_at"
        );
        assert_eq!(lines[1], "0,1,0,5,19,3,2,10,31");
        // Unset optional fields serialize as empty.
        assert_eq!(lines[2], "1,9,0,13,19,4,,,");
    }

    #[test]
    fn round_trips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.csv");
        save_task_log(&path, &sample_tasks()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().nth(1).unwrap().starts_with("0,1,0,"));
    }
}
