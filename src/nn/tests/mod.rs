/*
 * @Description  : nn 模块单元测试
 *
 * 测试按功能分组：
 * - parameter: 参数句柄与 ParameterDict
 * - partitioner: 按名称分组
 * - optimizer: 各优化器、配置与工厂
 */
