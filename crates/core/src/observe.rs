use std::fmt;

/// 訂閱代號，用於取消訂閱。 / Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer<T> = Box<dyn FnMut(&T)>;

/// 同步通知的觀察者清單。 / Observers invoked synchronously after every write.
///
/// A new observer is called once with the current value at registration so
/// late subscribers start from the present state rather than waiting for the
/// next change.
pub struct Subscribers<T> {
    observers: Vec<(SubscriptionId, Observer<T>)>,
    next_id: u64,
}

impl<T> Subscribers<T> {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
            next_id: 1,
        }
    }

    /// 註冊觀察者並立即送出目前值。 / Registers an observer and replays the current value to it.
    pub fn subscribe<F>(&mut self, current: &T, mut observer: F) -> SubscriptionId
    where
        F: FnMut(&T) + 'static,
    {
        observer(current);
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// 移除觀察者；若存在則回傳 `true`。 / Removes an observer, returning `true` if it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    /// 依註冊順序通知所有觀察者。 / Notifies observers in registration order.
    pub fn notify(&mut self, value: &T) {
        for (_, observer) in self.observers.iter_mut() {
            observer(value);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Subscribers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn subscribe_replays_current_value() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut subscribers = Subscribers::new();
        subscribers.subscribe(&1, move |value: &i32| sink.borrow_mut().push(*value));
        subscribers.notify(&2);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let seen = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&seen);
        let mut subscribers = Subscribers::new();
        let id = subscribers.subscribe(&"a", move |_: &&str| *sink.borrow_mut() += 1);
        assert!(subscribers.unsubscribe(id));
        assert!(!subscribers.unsubscribe(id));
        subscribers.notify(&"b");
        assert_eq!(*seen.borrow(), 1);
        assert!(subscribers.is_empty());
    }
}
