//! 笛卡尔积
//!
//! 互不相连的分量各自匹配后按笛卡尔积组合，左侧分量变化最慢。
//! 最左分量惰性拉取；其余分量在里程表第一次走到某个位置时才拉取该绑定并缓存，
//! 之后的左侧绑定重放缓存。

use log::debug;

use crate::core::error::{DBError, DBResult};
use crate::query::executor::match_path::environment::Environment;
use crate::query::executor::match_path::executor_state::ExecutorState;
use crate::query::executor::match_path::pattern_matcher::PatternMatcher;

/// 按需填充的右侧分量
struct CachedComponent {
    state: ExecutorState,
    rows: Vec<Environment>,
    complete: bool,
}

impl CachedComponent {
    fn new(state: ExecutorState) -> Self {
        Self {
            state,
            rows: Vec::new(),
            complete: false,
        }
    }

    /// 第 `index` 条绑定，必要时继续拉取；越界返回 `None`
    fn row(&mut self, index: usize) -> DBResult<Option<&Environment>> {
        while self.rows.len() <= index && !self.complete {
            match self.state.next() {
                Some(env) => self.rows.push(env?),
                None => {
                    self.complete = true;
                    debug!("笛卡尔分量缓存完成: {} 条绑定", self.rows.len());
                }
            }
        }
        Ok(self.rows.get(index))
    }
}

pub struct CartesianProduct {
    left: ExecutorState,
    right: Vec<CachedComponent>,
    checked: bool,
    current_left: Option<Environment>,
    odometer: Vec<usize>,
    matcher: PatternMatcher,
    finished: bool,
}

impl CartesianProduct {
    /// `components` 至少包含一个分量
    pub fn new(mut components: Vec<ExecutorState>, matcher: PatternMatcher) -> DBResult<Self> {
        if components.is_empty() {
            return Err(DBError::Internal("笛卡尔积至少需要一个分量".to_string()));
        }
        let left = components.remove(0);
        let odometer = vec![0; components.len()];
        Ok(Self {
            left,
            right: components.into_iter().map(CachedComponent::new).collect(),
            checked: false,
            current_left: None,
            odometer,
            matcher,
            finished: false,
        })
    }

    /// 任一右侧分量为空时整个积为空，不必拉取左侧
    fn check_right_nonempty(&mut self) -> DBResult<()> {
        if self.checked {
            return Ok(());
        }
        self.checked = true;
        for component in &mut self.right {
            if component.row(0)?.is_none() {
                self.finished = true;
                break;
            }
        }
        Ok(())
    }

    /// 里程表加一，最右侧变化最快；返回是否溢出
    fn advance_odometer(&mut self) -> DBResult<bool> {
        for i in (0..self.odometer.len()).rev() {
            self.odometer[i] += 1;
            if self.right[i].row(self.odometer[i])?.is_some() {
                return Ok(false);
            }
            self.odometer[i] = 0;
        }
        Ok(true)
    }

    fn next_product(&mut self) -> DBResult<Option<Environment>> {
        self.check_right_nonempty()?;
        if self.finished {
            return Ok(None);
        }
        self.matcher.check_deadline()?;
        let left = match self.current_left.take() {
            Some(left) => left,
            None => match self.left.next() {
                Some(left) => {
                    self.odometer.iter_mut().for_each(|i| *i = 0);
                    left?
                }
                None => {
                    self.finished = true;
                    return Ok(None);
                }
            },
        };

        let mut merged = left.clone();
        let Self { right, odometer, .. } = self;
        for (component, &index) in right.iter_mut().zip(odometer.iter()) {
            if let Some(env) = component.row(index)? {
                merged = merged.merge(env);
            }
        }
        if !self.advance_odometer()? {
            self.current_left = Some(left);
        }
        Ok(Some(merged))
    }
}

impl Iterator for CartesianProduct {
    type Item = DBResult<Environment>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_product() {
            Ok(Some(env)) => Some(Ok(env)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}
