//! MATCH 执行入口
//!
//! 把计划的各分量组合为笛卡尔积，再对合并后的绑定逐条应用 NOT 过滤。

use std::sync::Arc;

use log::trace;

use crate::core::error::DBResult;
use crate::query::executor::match_path::cartesian::CartesianProduct;
use crate::query::executor::match_path::environment::Environment;
use crate::query::executor::match_path::executor_state::ExecutorState;
use crate::query::executor::match_path::pattern_matcher::PatternMatcher;
use crate::query::planner::match_planning::{ComponentPlan, MatchPlan};

/// 完整绑定的惰性流
pub struct MatchExecutor {
    product: CartesianProduct,
    negative_filter: Option<Arc<ComponentPlan>>,
    matcher: PatternMatcher,
    rejected: usize,
    finished: bool,
}

impl MatchExecutor {
    pub fn new(plan: &MatchPlan, matcher: PatternMatcher) -> DBResult<Self> {
        Self::with_seed(plan, matcher, Environment::new())
    }

    /// 以预绑定的别名启动，各分量共享同一初始环境
    pub fn with_seed(plan: &MatchPlan, matcher: PatternMatcher, seed: Environment) -> DBResult<Self> {
        let components = plan
            .components
            .iter()
            .map(|component| ExecutorState::new(Arc::clone(component), matcher.clone(), seed.clone()))
            .collect();
        Ok(Self {
            product: CartesianProduct::new(components, matcher.clone())?,
            negative_filter: plan.negative_filter.clone(),
            matcher,
            rejected: 0,
            finished: false,
        })
    }

    /// 被 NOT 模式丢弃的绑定数
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    fn passes_negatives(&self, env: &Environment) -> DBResult<bool> {
        let Some(filter) = &self.negative_filter else {
            return Ok(true);
        };
        let mut state = ExecutorState::new(Arc::clone(filter), self.matcher.clone(), env.clone());
        state.next().transpose().map(|survivor| survivor.is_some())
    }
}

impl Iterator for MatchExecutor {
    type Item = DBResult<Environment>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            let env = match self.product.next()? {
                Ok(env) => env,
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            };
            match self.passes_negatives(&env) {
                Ok(true) => return Some(Ok(env)),
                Ok(false) => {
                    self.rejected += 1;
                    trace!("NOT 模式丢弃绑定: {:?}", env);
                }
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }
    }
}
