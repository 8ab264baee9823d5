//! # Partition: split one handler into two disjoint branches.

use std::rc::Rc;

use crate::halt::Halt;
use crate::handler::Handler;

/// Splits `handler` into `(matching, rest)` by a predicate.
///
/// Implemented as two sibling subscriptions sharing the predicate; each
/// silently halts the branch the value does not belong to, so for every
/// emission exactly one of the two downstream handlers fires. If the
/// predicate panics, neither does.
///
/// # Example
/// ```
/// use eventflow::{create_event, create_partition, with_scope};
///
/// let ((evens, odds), scope) = with_scope(|| {
///     let (on, _emit) = create_event::<u32>();
///     create_partition(&on, |n| n % 2 == 0)
/// });
/// # let _ = (evens, odds);
/// scope.dispose();
/// ```
pub fn create_partition<E, P>(handler: &Handler<E>, predicate: P) -> (Handler<E>, Handler<E>)
where
    E: Clone + 'static,
    P: Fn(&E) -> bool + 'static,
{
    let predicate = Rc::new(predicate);

    let matching = {
        let predicate = Rc::clone(&predicate);
        handler.subscribe(move |value| {
            if predicate(&value) {
                Ok(value)
            } else {
                Err(Halt::new())
            }
        })
    };
    let rest = handler.subscribe(move |value| {
        if predicate(&value) {
            Err(Halt::new())
        } else {
            Ok(value)
        }
    });

    (matching, rest)
}
