//! 按事件类型分发的消费者接口

use std::ops::ControlFlow;

use crate::trace::{MonCreate, MonData, MonState, NodePosition, Scope};

/// 回调返回值：`Continue(())` 继续，`Break(code)` 立即停止分发并以 `code` 作为结果。
pub type Flow = ControlFlow<i32>;

/// 事件消费者：每种事件一个方法。
///
/// 所有方法都没有默认实现，格式新增事件类型时，每个消费者都必须显式处理。
pub trait EventHandler {
    /// 当前次版本不认识的事件（`raw` 为线上编号）
    fn unknown(&mut self, scope: &Scope, raw: u16) -> Flow;
    fn mon_create(&mut self, scope: &Scope, event: &MonCreate) -> Flow;
    fn mon_state(&mut self, scope: &Scope, event: &MonState) -> Flow;
    /// 数据事件的负载所有权交给消费者
    fn mon_data(&mut self, scope: &Scope, event: MonData) -> Flow;
    fn node_create(&mut self, scope: &Scope) -> Flow;
    fn node_destroy(&mut self, scope: &Scope) -> Flow;
    fn node_position(&mut self, scope: &Scope, event: &NodePosition) -> Flow;
}
