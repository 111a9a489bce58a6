#[cfg(test)]
mod tests {
    use time::OffsetDateTime;
    use uuid::Uuid;
    use crate::models::{CreatePollRequest, Poll};
    use crate::tally::{aggregate, Tally, TallyError, VoteAction};
    use crate::validation::{validate_poll_request, ValidationError};

    fn tally(votes: &[(&str, u32)], voted_by: &[(&str, usize)]) -> Tally {
        Tally {
            votes: votes.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            voted_by: voted_by.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    fn poll(options: &[&str], tally: Tally) -> Poll {
        Poll {
            poll_id: Uuid::new_v4(),
            author_id: "author".into(),
            author_name: "Author".into(),
            question: "Which idea?".into(),
            options: options.iter().map(|o| o.to_string()).collect(),
            tally,
            description: String::new(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn request(question: &str, options: &[&str]) -> CreatePollRequest {
        CreatePollRequest {
            question: question.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
            description: None,
        }
    }

    #[test]
    fn test_new_vote() {
        let outcome = Tally::default().apply("u1", 0, 3).unwrap();
        assert_eq!(outcome.tally, tally(&[("0", 1)], &[("u1", 0)]));
        assert_eq!(outcome.selection, Some(0));
        assert_eq!(outcome.action, VoteAction::Cast);
    }

    #[test]
    fn test_retract_vote() {
        let start = tally(&[("0", 1)], &[("u1", 0)]);
        let outcome = start.apply("u1", 0, 3).unwrap();
        assert_eq!(outcome.tally, tally(&[("0", 0)], &[]));
        assert_eq!(outcome.selection, None);
        assert_eq!(outcome.action, VoteAction::Retracted);
    }

    #[test]
    fn test_change_vote() {
        let start = tally(&[("0", 1), ("1", 0)], &[("u1", 0)]);
        let outcome = start.apply("u1", 1, 3).unwrap();
        assert_eq!(outcome.tally, tally(&[("0", 0), ("1", 1)], &[("u1", 1)]));
        assert_eq!(outcome.selection, Some(1));
        assert_eq!(outcome.action, VoteAction::Changed { from: 0 });
    }

    #[test]
    fn test_apply_leaves_receiver_untouched() {
        let start = tally(&[("2", 4)], &[("a", 2), ("b", 2), ("c", 2), ("d", 2)]);
        let snapshot = start.clone();
        start.apply("a", 1, 3).unwrap();
        assert_eq!(start, snapshot);
    }

    #[test]
    fn test_out_of_range_option() {
        let start = tally(&[("0", 1)], &[("u1", 0)]);
        assert_eq!(
            start.apply("u1", 99, 3),
            Err(TallyError::InvalidOption { index: 99, option_count: 3 })
        );
        assert_eq!(
            Tally::default().apply("u1", 3, 3),
            Err(TallyError::InvalidOption { index: 3, option_count: 3 })
        );
    }

    #[test]
    fn test_decrement_floored_on_corrupted_state() {
        // u1 is recorded but the count was lost elsewhere.
        let start = tally(&[], &[("u1", 0)]);
        let retracted = start.apply("u1", 0, 2).unwrap();
        assert_eq!(retracted.tally.count(0), 0);
        assert!(retracted.tally.voted_by.is_empty());

        let start = tally(&[("0", 0)], &[("u1", 0)]);
        let changed = start.apply("u1", 1, 2).unwrap();
        assert_eq!(changed.tally.count(0), 0);
        assert_eq!(changed.tally.count(1), 1);
    }

    #[test]
    fn test_repeated_retractions_never_negative() {
        let mut state = Tally::default();
        for _ in 0..10 {
            state = state.apply("u1", 1, 2).unwrap().tally;
            assert!(state.votes.values().all(|&c| c <= 1));
        }
        // Ten taps on the same option end retracted.
        assert_eq!(state.count(1), 0);
        assert!(state.voted_by.is_empty());
    }

    #[test]
    fn test_conservation_over_long_sequence() {
        let users = ["ana", "ben", "cai", "dee", "eli", "fay", "gus"];
        let option_count = 4;
        let mut state = Tally::default();

        // Deterministic but scrambled walk over (user, option) pairs.
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        for _ in 0..2_000 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let user = users[(seed % users.len() as u64) as usize];
            let option = ((seed >> 8) % option_count as u64) as usize;

            state = state.apply(user, option, option_count).unwrap().tally;
            assert!(state.is_consistent(option_count), "inconsistent after {user} -> {option}: {state:?}");
            assert!(state.voted_by.len() <= users.len());
        }
    }

    #[test]
    fn test_each_user_holds_at_most_one_vote() {
        let mut state = Tally::default();
        for option in [0, 1, 2, 1, 0, 2] {
            state = state.apply("u1", option, 3).unwrap().tally;
            assert_eq!(state.total_votes(), 1);
            assert_eq!(state.voted_by.len(), 1);
        }
    }

    #[test]
    fn test_aggregate_zero_votes() {
        let p = poll(&["A", "B", "C"], Tally::default());
        let summary = aggregate(&p, Some("u1"));
        assert_eq!(summary.total_votes, 0);
        assert_eq!(summary.selected, None);
        assert_eq!(summary.options.len(), 3);
        assert!(summary.options.iter().all(|o| o.count == 0 && o.percent == 0.0));
    }

    #[test]
    fn test_aggregate_percentages() {
        let p = poll(
            &["A", "B", "C"],
            tally(&[("0", 3), ("2", 1)], &[("a", 0), ("b", 0), ("c", 0), ("d", 2)]),
        );
        let summary = aggregate(&p, Some("d"));
        assert_eq!(summary.total_votes, 4);
        assert_eq!(summary.selected, Some(2));

        let counts: Vec<_> = summary.options.iter().map(|o| o.count).collect();
        assert_eq!(counts, vec![3, 0, 1]);
        assert!((summary.options[0].percent - 0.75).abs() < f64::EPSILON);
        assert_eq!(summary.options[1].percent, 0.0);
        assert!((summary.options[2].percent - 0.25).abs() < f64::EPSILON);

        let sum: f64 = summary.options.iter().map(|o| o.percent).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert_eq!(summary.options[1].label, "B");
    }

    #[test]
    fn test_aggregate_viewer_selection() {
        let p = poll(&["A", "B"], tally(&[("1", 1)], &[("u1", 1)]));
        assert_eq!(aggregate(&p, Some("u1")).selected, Some(1));
        assert_eq!(aggregate(&p, Some("u2")).selected, None);
        assert_eq!(aggregate(&p, None).selected, None);
        assert_eq!(aggregate(&p, None), aggregate(&p, None));
    }

    #[test]
    fn test_validate_poll_request() {
        assert!(validate_poll_request(&request("Best idea?", &["A", "B"])).is_ok());
        assert_eq!(validate_poll_request(&request("   ", &["A", "B"])), Err(ValidationError::EmptyQuestion));
        assert_eq!(validate_poll_request(&request("Q", &["A"])), Err(ValidationError::TooFewOptions));
        assert_eq!(
            validate_poll_request(&request("Q", &["1", "2", "3", "4", "5", "6", "7"])),
            Err(ValidationError::TooManyOptions)
        );
        assert_eq!(validate_poll_request(&request("Q", &["A", " "])), Err(ValidationError::EmptyOption));
        assert_eq!(
            validate_poll_request(&request("Q", &["Pizza", "pizza "])),
            Err(ValidationError::DuplicateOption("pizza".into()))
        );

        let long_option = "x".repeat(81);
        assert_eq!(
            validate_poll_request(&request("Q", &["A", &long_option])),
            Err(ValidationError::OptionTooLong)
        );

        let mut with_description = request("Q", &["A", "B"]);
        with_description.description = Some("d".repeat(1001));
        assert_eq!(validate_poll_request(&with_description), Err(ValidationError::DescriptionTooLong));
    }

    #[test]
    fn test_new_poll_starts_empty() {
        let mut req = request("  Launch a makerspace?  ", &[" Yes ", "No"]);
        req.description = Some("  ".into());
        let p = Poll::new("u1", Some("  "), &req);

        assert_eq!(p.question, "Launch a makerspace?");
        assert_eq!(p.options, vec!["Yes".to_string(), "No".to_string()]);
        assert_eq!(p.author_name, "Anonymous");
        assert_eq!(p.description, "");
        assert_eq!(p.tally, Tally::default());
        assert_eq!(p.total_votes(), 0);

        let named = Poll::new("u1", Some("Joseph"), &req);
        assert_eq!(named.author_name, "Joseph");
        assert_ne!(named.poll_id, p.poll_id);
    }
}
