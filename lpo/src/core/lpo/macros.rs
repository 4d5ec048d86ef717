//! Convenient Macros for creating labelled partial orders
///
/// Creates an [`LPO`](crate::core::lpo::LPO) from generating arcs.
///
/// Events are created on first mention, labelled with their id.
/// Events without any arc can be listed in brackets before the arcs.
///
/// # Examples
///
/// ```rust
/// use lpo::{lpo, LPO};
/// let order: LPO = lpo!("example"; "a" => "b", "b" => "c", "d" => "c");
/// assert_eq!(order.event_count(), 4);
///
/// let with_isolated: LPO = lpo!("isolated"; ["x", "y"]; "a" => "b");
/// assert_eq!(with_isolated.event_count(), 4);
/// ```
#[macro_export]
macro_rules! lpo {
    ($name:expr; [$($event:expr),* $(,)?] $(; $($from:expr => $to:expr),* $(,)?)?) => {{
        #[allow(unused_imports)]
        use $crate::core::lpo::{Event, EventID, LPO};

        #[allow(unused_mut)]
        let mut result = LPO::new($name);
        $(
            let id = EventID::from($event);
            if !result.contains_event(&id) {
                result
                    .add_event(Event::new(id.clone(), id.to_string()))
                    .expect("event id was checked to be unused");
            }
        )*
        $($(
            let from = EventID::from($from);
            let to = EventID::from($to);
            for id in [&from, &to] {
                if !result.contains_event(id) {
                    result
                        .add_event(Event::new(id.clone(), id.to_string()))
                        .expect("event id was checked to be unused");
                }
            }
            result
                .add_generating_arc(from, to)
                .expect("both endpoints were added above");
        )*)?
        result
    }};
    ($name:expr; $($from:expr => $to:expr),* $(,)?) => {
        $crate::lpo!($name; []; $($from => $to),*)
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn macro_builds_generating_relation() {
        let order = crate::lpo!("abcd"; "a" => "b", "b" => "c", "d" => "c");
        assert_eq!(order.name, "abcd");
        assert_eq!(order.event_count(), 4);
        assert_eq!(order.arcs().len(), 3);
        assert!(order.arcs().iter().all(|arc| arc.generating && !arc.skeleton));
    }

    #[test]
    fn macro_with_isolated_events() {
        let order = crate::lpo!("iso"; ["q", "a"]);
        assert_eq!(order.event_count(), 2);
        assert!(order.arcs().is_empty());
    }
}
